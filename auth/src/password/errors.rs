use thiserror::Error;

/// Error type for password operations.
///
/// Messages describe the failure only; they never carry the password or hash.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored credential is not a valid hash encoding: {0}")]
    InvalidCredentialFormat(String),
}
