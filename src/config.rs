use crate::errors::ServiceError;
use qrcode::EcLevel;
use std::env;
use std::fmt;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_TOKEN_TTL_SECS: i64 = 300;
const MAX_TOKEN_TTL_SECS: i64 = 86_400;
const DEFAULT_MODULE_PIXELS: u32 = 10;
const MAX_MODULE_PIXELS: u32 = 64;
// HS256 keys shorter than the digest size are legal but weak
const RECOMMENDED_SECRET_LEN: usize = 32;

/// HMAC key shared by every issuer and verifier of QR tokens.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ServiceError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ServiceError::MissingSecret);
        }
        Ok(SigningSecret(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {}])", self.0.len())
    }
}

/// Configuration settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub signing_secret: SigningSecret,
    // Still accepted by the verifier while a rotation is in progress
    pub previous_secret: Option<SigningSecret>,
    pub token_ttl_secs: i64,
    pub ec_level: EcLevel,
    pub module_pixels: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ServiceError> {
        dotenv::dotenv().ok();

        let signing_secret = match env::var("QR_SIGNING_SECRET") {
            Ok(value) => SigningSecret::new(value)?,
            Err(_) => return Err(ServiceError::MissingSecret),
        };
        if signing_secret.as_bytes().len() < RECOMMENDED_SECRET_LEN {
            log::warn!(
                "QR_SIGNING_SECRET is shorter than {} bytes",
                RECOMMENDED_SECRET_LEN
            );
        }

        let previous_secret = env::var("QR_PREVIOUS_SECRET")
            .ok()
            .filter(|value| !value.is_empty())
            .map(SigningSecret::new)
            .transpose()?;

        let token_ttl_secs = match env::var("QR_TOKEN_TTL_SECS") {
            Ok(value) => value
                .parse::<i64>()
                .ok()
                .filter(|ttl| (1..=MAX_TOKEN_TTL_SECS).contains(ttl))
                .ok_or_else(|| {
                    ServiceError::InvalidConfig(format!("QR_TOKEN_TTL_SECS: {}", value))
                })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        let ec_level = match env::var("QR_EC_LEVEL") {
            Ok(value) => parse_ec_level(&value)?,
            Err(_) => EcLevel::M,
        };

        let module_pixels = match env::var("QR_MODULE_PIXELS") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|px| (1..=MAX_MODULE_PIXELS).contains(px))
                .ok_or_else(|| {
                    ServiceError::InvalidConfig(format!("QR_MODULE_PIXELS: {}", value))
                })?,
            Err(_) => DEFAULT_MODULE_PIXELS,
        };

        Ok(Config {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            signing_secret,
            previous_secret,
            token_ttl_secs,
            ec_level,
            module_pixels,
        })
    }
}

/// Level L is refused: printed cards need at least M to survive wear.
fn parse_ec_level(value: &str) -> Result<EcLevel, ServiceError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        other => Err(ServiceError::InvalidConfig(format!(
            "QR_EC_LEVEL must be one of M, Q, H (got {})",
            other
        ))),
    }
}
