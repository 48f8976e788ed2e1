use crate::models::token::Verdict;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Returned to the card holder's device for display.
#[derive(Debug, Serialize)]
pub struct QrCodeResponse {
    pub token: String,
    pub image_base64: String,
    pub expires_at: DateTime<Utc>,
}

/// Returned to the scanning device.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VerificationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Verdict> for VerificationResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Valid { subject } => Self {
                valid: true,
                subject: Some(subject),
                reason: None,
            },
            Verdict::Rejected(err) => Self {
                valid: false,
                subject: None,
                reason: Some(err.reason().to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
