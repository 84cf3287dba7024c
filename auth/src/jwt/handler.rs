use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::DEFAULT_TOKEN_TTL_SECONDS;
use super::errors::JwtError;

/// Issues and verifies signed, time-bound identity tokens.
///
/// Stateless: everything needed to validate a token is in the token and the
/// secret held here. Uses HS256 (HMAC with SHA-256).
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key and the default 24 hour TTL.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Rotating the secret invalidates every outstanding token
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS),
        }
    }

    /// Override the lifetime of issued tokens.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Lifetime applied to issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an identity, valid from now for the configured TTL.
    ///
    /// # Returns
    /// Encoded token and the claims it carries
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, id: impl ToString, username: &str) -> Result<(String, Claims), JwtError> {
        self.issue_at(id, username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        id: impl ToString,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), JwtError> {
        let claims = Claims::for_identity(id, username, self.ttl, now);
        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    /// Sign claims into a compact JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token or signature mismatch
    /// * `Expired` - Signature is intact but the token has expired
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// The signature is checked before expiry is looked at, so a tampered
    /// token is always `InvalidToken` regardless of its claimed expiration.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is evaluated below against the supplied clock, without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?
            .claims;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn replace_byte(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let handler = JwtHandler::new(SECRET);

        let (token, claims) = handler.issue("user123", "alice").expect("Failed to issue");
        assert!(!token.is_empty());

        let decoded = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(decoded, claims);
        assert_eq!(decoded.sub, "user123");
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn test_valid_until_one_second_before_expiry() {
        let handler = JwtHandler::new(SECRET);
        let t = issued_at();

        let (token, _) = handler.issue_at("user123", "alice", t).unwrap();

        let decoded = handler.verify_at(&token, t + Duration::seconds(86_399));
        assert!(decoded.is_ok());

        let expired = handler.verify_at(&token, t + Duration::seconds(86_400));
        assert_eq!(expired, Err(JwtError::Expired));

        let expired = handler.verify_at(&token, t + Duration::seconds(86_401));
        assert_eq!(expired, Err(JwtError::Expired));
    }

    #[test]
    fn test_custom_ttl() {
        let handler = JwtHandler::new(SECRET).with_ttl(Duration::seconds(60));
        let t = issued_at();

        let (token, claims) = handler.issue_at("user123", "alice", t).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);

        assert!(handler.verify_at(&token, t + Duration::seconds(59)).is_ok());
        assert_eq!(
            handler.verify_at(&token, t + Duration::seconds(60)),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_tampered_payload_is_invalid_not_expired() {
        let handler = JwtHandler::new(SECRET);
        let t = issued_at();
        let (token, _) = handler.issue_at("user123", "alice", t).unwrap();

        let payload_start = token.find('.').unwrap() + 1;
        let tampered = replace_byte(&token, payload_start + 5);

        // Still invalid, not expired, even long after expiration.
        for now in [t, t + Duration::seconds(86_401)] {
            assert!(matches!(
                handler.verify_at(&tampered, now),
                Err(JwtError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let handler = JwtHandler::new(SECRET);
        let (token, _) = handler.issue("user123", "alice").unwrap();

        let tampered = replace_byte(&token, token.len() - 10);

        assert!(matches!(
            handler.verify(&tampered),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_forged_claims_are_invalid() {
        let handler = JwtHandler::new(SECRET);
        let (token, _) = handler.issue("user123", "alice").unwrap();
        let (forged, _) = JwtHandler::new(b"attacker_key_also_32_bytes_long!!!")
            .issue("user123", "mallory")
            .unwrap();

        // Header and payload from the forgery, signature from the genuine token.
        let genuine_signature = token.rsplit('.').next().unwrap();
        let forged_prefix = forged.rsplitn(2, '.').nth(1).unwrap();
        let spliced = format!("{}.{}", forged_prefix, genuine_signature);

        assert!(matches!(
            handler.verify(&spliced),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_garbage() {
        let handler = JwtHandler::new(SECRET);

        for token in ["", "invalid.token.here", "a.b", "not a token"] {
            assert!(matches!(
                handler.verify(token),
                Err(JwtError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let (token, _) = handler1.issue("user123", "alice").unwrap();

        assert!(matches!(
            handler2.verify(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }
}
