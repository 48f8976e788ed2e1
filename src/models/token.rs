use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator carried by every QR token. Other signed tokens of the
/// platform (sessions and the like) use different values, so one can never
/// stand in for another.
pub const QR_TOKEN_PURPOSE: &str = "digital_id_qr";

/// Claims of a dynamic QR identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub purpose: String,
    // Random per issuance, base64url
    pub jti: String,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of checking a presented token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid { subject: String },
    Rejected(crate::errors::TokenError),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }
}
