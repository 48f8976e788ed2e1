use crate::{
    config::Config,
    errors::ServiceError,
    models::responses::{QrCodeResponse, VerificationResponse},
    models::token::Verdict,
    services::{qr_service::QrRenderer, token_service::TokenService},
};
use log::{debug, error, info};

/// Digital ID card operations exposed to request handlers and the CLI.
///
/// Built once at startup from [`Config`]; everything inside is read-only.
pub struct DigitalCardService {
    pub tokens: TokenService,
    pub renderer: QrRenderer,
}

impl DigitalCardService {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(TokenService::new(config), QrRenderer::from_config(config))
    }

    pub fn from_parts(tokens: TokenService, renderer: QrRenderer) -> Self {
        Self { tokens, renderer }
    }

    /// Issues a fresh token for `user_id` and renders it as a QR image.
    pub fn generate_dynamic_qr(&self, user_id: &str) -> Result<QrCodeResponse, ServiceError> {
        let issued = self.tokens.issue(user_id)?;
        let image_base64 = self.renderer.encode_base64(&issued.token).map_err(|e| {
            error!("Failed to render QR code for {}: {}", user_id, e);
            e
        })?;

        info!(
            "Issued QR token for {} (expires {})",
            user_id,
            issued.expires_at.to_rfc3339()
        );

        Ok(QrCodeResponse {
            token: issued.token,
            image_base64,
            expires_at: issued.expires_at,
        })
    }

    /// Verifies a scanned token. Rejections are expected traffic and only
    /// logged at debug level.
    pub fn verify_qr_token(&self, token: &str) -> VerificationResponse {
        let verdict = self.tokens.verify(token);
        match &verdict {
            Verdict::Valid { subject } => info!("QR token accepted for {}", subject),
            Verdict::Rejected(reason) => debug!("QR token rejected: {}", reason),
        }
        verdict.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningSecret;
    use base64::engine::general_purpose::STANDARD as Base64Engine;
    use base64::Engine;
    use chrono::Utc;
    use qrcode::EcLevel;

    fn card_service() -> DigitalCardService {
        let secret = SigningSecret::new("card-service-test-secret-0123456789").unwrap();
        DigitalCardService::from_parts(
            TokenService::with_secrets(&secret, None, 300),
            QrRenderer::new(EcLevel::M, 4),
        )
    }

    #[test]
    fn test_generate_and_verify() {
        let service = card_service();
        let before = Utc::now();
        let qr = service.generate_dynamic_qr("user-42").unwrap();

        let lifetime = qr.expires_at - before;
        assert!(lifetime.num_seconds() >= 299 && lifetime.num_seconds() <= 300);

        let png = Base64Engine.decode(&qr.image_base64).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        assert_eq!(
            service.verify_qr_token(&qr.token),
            VerificationResponse {
                valid: true,
                subject: Some("user-42".to_string()),
                reason: None,
            }
        );
    }

    #[test]
    fn test_verify_rejection_is_structured() {
        let response = card_service().verify_qr_token("garbage-not-a-token");
        assert!(!response.valid);
        assert_eq!(response.subject, None);
        assert_eq!(response.reason.as_deref(), Some("malformed"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "valid": false, "reason": "malformed" }));
    }

    #[test]
    fn test_empty_user_id_is_input_error() {
        assert!(matches!(
            card_service().generate_dynamic_qr(""),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
