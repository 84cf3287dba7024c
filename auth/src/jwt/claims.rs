use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Token lifetime applied when none is configured (24 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Identity assertion carried inside an access token.
///
/// A snapshot of the identity at issuance time; it is never refreshed from
/// storage while the token lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (identity identifier)
    pub sub: String,

    /// Username at issuance time
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for an identity, valid for `ttl` starting at `issued_at`.
    ///
    /// # Arguments
    /// * `id` - Identity identifier (becomes `sub`)
    /// * `username` - Username of the identity
    /// * `ttl` - Lifetime of the token
    /// * `issued_at` - Issuance instant
    pub fn for_identity(
        id: impl ToString,
        username: impl Into<String>,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let expiration = issued_at + ttl;

        Self {
            sub: id.to_string(),
            username: username.into(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Expiration as a UTC instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// Expiry is exclusive: a token is no longer valid at exactly `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
