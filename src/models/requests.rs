use serde::Deserialize;
use validator::Validate;

/// Query for issuing a QR code.
///
/// # Examples
///
/// ```text
/// GET /api/v1/card/qr?user_id=4f6c2a0e-8d1b-4c1e-9a57-0b3f7d2e9c11
/// ```
#[derive(Debug, Validate, Deserialize)]
pub struct IssueQrQuery {
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
}

/// Request structure for verifying a scanned token.
///
/// Not validated: oversized or empty tokens are answered with a
/// `malformed` verdict rather than a 400.
#[derive(Debug, Deserialize)]
pub struct VerifyQrRequest {
    pub token: String,
}
