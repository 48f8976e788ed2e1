use crate::config::{Config, SigningSecret};
use crate::errors::{ServiceError, TokenError};
use crate::models::token::{IssuedToken, QrClaims, Verdict, QR_TOKEN_PURPOSE};
use crate::utils::generate_nonce;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;

/// Longest string the verifier will attempt to parse. Tokens from this
/// issuer are around 250 bytes.
pub const MAX_TOKEN_LENGTH: usize = 4096;

/// Issues and verifies dynamic QR identity tokens (HS256 JWTs).
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self::with_secrets(
            &config.signing_secret,
            config.previous_secret.as_ref(),
            config.token_ttl_secs,
        )
    }

    /// `previous` is only ever used to verify, never to sign.
    pub fn with_secrets(
        current: &SigningSecret,
        previous: Option<&SigningSecret>,
        ttl_secs: i64,
    ) -> Self {
        let mut decoding_keys = vec![DecodingKey::from_secret(current.as_bytes())];
        if let Some(previous) = previous {
            decoding_keys.push(DecodingKey::from_secret(previous.as_bytes()));
        }

        // The library only checks the signature; purpose and expiry are
        // checked afterwards against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(current.as_bytes()),
            decoding_keys,
            validation,
            ttl_secs,
        }
    }

    /// Issues a token for `subject` valid from now until now + ttl.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, ServiceError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, ServiceError> {
        if subject.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "subject must not be empty".to_string(),
            ));
        }

        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.ttl_secs)
            .ok_or_else(|| {
                ServiceError::InvalidConfig(format!("token ttl {}s overflows", self.ttl_secs))
            })?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| ServiceError::InvalidConfig(format!("expiry {} out of range", exp)))?;

        let claims = QrClaims {
            sub: subject.to_string(),
            iat,
            exp,
            purpose: QR_TOKEN_PURPOSE.to_string(),
            jti: generate_nonce(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Checks a presented token against the current time. Never fails; every
    /// problem becomes a rejection.
    pub fn verify(&self, token: &str) -> Verdict {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Verdict {
        match self.check(token, now) {
            Ok(claims) => Verdict::Valid {
                subject: claims.sub,
            },
            Err(err) => Verdict::Rejected(err),
        }
    }

    fn check(&self, token: &str, now: DateTime<Utc>) -> Result<QrClaims, TokenError> {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::MalformedToken);
        }

        let claims = self.decode_signed(token)?;

        if claims.purpose != QR_TOKEN_PURPOSE {
            return Err(TokenError::WrongPurpose);
        }
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Tries each accepted secret in turn. Nothing from the claims is looked
    /// at until one of them authenticates the token.
    fn decode_signed(&self, token: &str) -> Result<QrClaims, TokenError> {
        let mut result = Err(TokenError::InvalidSignature);
        for key in &self.decoding_keys {
            result = decode::<QrClaims>(token, key, &self.validation)
                .map(|data| data.claims)
                .map_err(|e| classify(e.kind()));
            if result != Err(TokenError::InvalidSignature) {
                break;
            }
        }
        result
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::MalformedToken,
    }
}
