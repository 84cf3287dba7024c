use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    /// Malformed input or a signature that does not verify. Terminal.
    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    /// Signature verified but the token is past its expiration.
    #[error("Token is expired")]
    Expired,
}
