use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT issuance.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    decoy_hash: OnceLock<Option<String>>,
}

/// Plaintext behind the decoy hash verified for unknown usernames.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-identities";

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,

    /// Claims signed into the token
    pub claims: Claims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator with default hashing cost and token TTL.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Override the lifetime of issued tokens.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.jwt_handler = self.jwt_handler.with_ttl(ttl);
        self
    }

    /// Replace the password hasher (e.g. to lower the cost in tests).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self.decoy_hash = OnceLock::new();
        self
    }

    /// Lifetime applied to issued tokens.
    pub fn token_ttl(&self) -> Duration {
        self.jwt_handler.ttl()
    }

    /// Hash a password for storage.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token for the identity.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored credential hash
    /// * `id` - Identity identifier placed in `sub`
    /// * `username` - Username placed in the claims
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        id: impl ToString,
        username: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let (access_token, claims) = self.jwt_handler.issue(id, username)?;

        Ok(AuthenticationResult {
            access_token,
            claims,
        })
    }

    /// Fail a login for a username that has no stored credential.
    ///
    /// Verifies `password` against a decoy hash made with the same cost
    /// parameters, so this path costs the same as a wrong password.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        match self.decoy_hash() {
            Some(decoy) => {
                let _ = self.password_hasher.verify(password, decoy);
            }
            None => {
                let _ = self.password_hasher.hash(password);
            }
        }
        AuthenticationError::InvalidCredentials
    }

    /// Decoy hash, computed once on first use.
    fn decoy_hash(&self) -> Option<&str> {
        self.decoy_hash
            .get_or_init(|| self.password_hasher.hash(DECOY_PASSWORD).ok())
            .as_deref()
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token or bad signature
    /// * `Expired` - Token is past its expiration
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }

    /// Validate a token as if the current time were `now`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        self.jwt_handler.verify_at(token, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!")
            .with_password_hasher(PasswordHasher::from_costs(8, 1, 1).unwrap())
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, &hash, "user123", "alice")
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());
        assert_eq!(result.claims.sub, "user123");

        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded, result.claims);
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", &hash, "user123", "alice");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_malformed_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("my_password", "plaintext?", "user123", "alice");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(
                PasswordError::InvalidCredentialFormat(_)
            ))
        ));
    }

    #[test]
    fn test_token_ttl_is_applied() {
        let authenticator = authenticator().with_token_ttl(Duration::seconds(30));
        let hash = authenticator.hash_password("pw").unwrap();

        let result = authenticator
            .authenticate("pw", &hash, "user123", "alice")
            .unwrap();

        assert_eq!(authenticator.token_ttl(), Duration::seconds(30));
        assert_eq!(result.claims.exp - result.claims.iat, 30);

        let later = Utc::now() + Duration::seconds(31);
        assert_eq!(
            authenticator.validate_token_at(&result.access_token, later),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_reject_unknown_uses_matching_decoy() {
        let authenticator = authenticator();

        assert!(matches!(
            authenticator.reject_unknown("whatever"),
            AuthenticationError::InvalidCredentials
        ));

        let decoy = authenticator.decoy_hash().expect("decoy hash should exist");
        let own = authenticator.hash_password("pw").unwrap();
        let decoy_params = argon2::password_hash::PasswordHash::new(decoy).unwrap().params;
        let own_params = argon2::password_hash::PasswordHash::new(&own).unwrap().params;
        assert_eq!(decoy_params, own_params);

        // Computed once and reused.
        assert!(std::ptr::eq(
            decoy,
            authenticator.decoy_hash().unwrap()
        ));
    }

    #[test]
    fn test_replacing_hasher_resets_decoy() {
        let authenticator = authenticator();
        authenticator.reject_unknown("warm");

        let rebuilt = authenticator
            .with_password_hasher(PasswordHasher::from_costs(16, 2, 1).unwrap());
        let decoy = rebuilt.decoy_hash().unwrap();

        assert!(decoy.contains("m=16,t=2,p=1"));
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }
}
