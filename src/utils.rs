use base64::engine::general_purpose::{STANDARD as Base64Engine, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Bytes of entropy in a token nonce (128 bits).
pub const NONCE_LEN: usize = 16;

/// Generates a fresh token nonce from the OS CSPRNG, base64url without padding.
pub fn generate_nonce() -> String {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    URL_SAFE_NO_PAD.encode(nonce)
}

/// Generates a random signing secret, standard base64 encoded, suitable for
/// `QR_SIGNING_SECRET`.
pub fn generate_secret(len: usize) -> String {
    let mut secret = vec![0u8; len];
    OsRng.fill_bytes(&mut secret);
    Base64Engine.encode(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nonce_has_128_bits() {
        let nonce = generate_nonce();
        let decoded = URL_SAFE_NO_PAD.decode(&nonce).unwrap();
        assert_eq!(decoded.len(), NONCE_LEN);
    }

    #[test]
    fn test_nonces_do_not_repeat() {
        let nonces: HashSet<String> = (0..1000).map(|_| generate_nonce()).collect();
        assert_eq!(nonces.len(), 1000);
    }

    #[test]
    fn test_generate_secret_length() {
        let secret = generate_secret(32);
        assert_eq!(Base64Engine.decode(secret).unwrap().len(), 32);
    }
}
