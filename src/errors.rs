use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

/// Hard failures of the service: bad configuration, bad caller input, or a
/// bug on the issuance path. Token rejections are not errors here, see
/// [`TokenError`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("QR_SIGNING_SECRET is not set or empty")]
    MissingSecret,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Payload of {len} bytes exceeds QR capacity")]
    EncodingCapacityExceeded { len: usize },
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("Failed to render QR image: {0}")]
    Render(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::error::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.status_code() {
            StatusCode::BAD_REQUEST => self.to_string(),
            _ => "Internal server error".to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.status_code().to_string(),
            message,
        })
    }
}

/// Error response for API endpoints.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    message: String,
}

/// Reasons a presented QR token is rejected.
///
/// These never leave the verifier as errors; they are folded into a
/// `{valid: false, reason}` verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed")]
    MalformedToken,
    #[error("invalid_signature")]
    InvalidSignature,
    #[error("wrong_purpose")]
    WrongPurpose,
    #[error("expired")]
    Expired,
}

impl TokenError {
    /// Machine-readable reason returned to scanners.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::WrongPurpose => "wrong_purpose",
            TokenError::Expired => "expired",
        }
    }
}
