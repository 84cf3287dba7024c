use async_trait::async_trait;

use crate::identity::errors::IdentityError;
use crate::identity::errors::StoreError;
use crate::identity::models::AuthenticatedIdentity;
use crate::identity::models::CredentialHash;
use crate::identity::models::Identity;
use crate::identity::models::IssuedToken;
use crate::identity::models::LoginCommand;
use crate::identity::models::RegisterCommand;
use crate::identity::models::RegisteredIdentity;
use crate::identity::models::Username;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// # Arguments
    /// * `command` - Validated username and plaintext password
    ///
    /// # Returns
    /// Created identity, without its credential hash
    ///
    /// # Errors
    /// * `UsernameTaken` - Username is already registered
    /// * `StoreUnavailable` - Credential store failed
    /// * `Internal` - Password hashing failed
    async fn register(&self, command: RegisterCommand) -> Result<RegisteredIdentity, IdentityError>;

    /// Verify credentials and issue an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (indistinguishable)
    /// * `StoreUnavailable` - Credential store failed
    /// * `Internal` - Stored hash unusable or token signing failed
    async fn authenticate(&self, command: LoginCommand) -> Result<IssuedToken, IdentityError>;

    /// Resolve the caller behind a presented token.
    ///
    /// Pure computation; never touches the credential store.
    ///
    /// # Errors
    /// * `Unauthenticated` - No token was presented
    /// * `InvalidToken` - Token is malformed, tampered with, or expired
    fn resolve(&self, token: Option<&str>) -> Result<AuthenticatedIdentity, IdentityError>;
}

/// Durable mapping from username to identity record.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve identity by username (exact, case-sensitive match).
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<Identity>, StoreError>;

    /// Atomically create an identity unless the username is already taken.
    ///
    /// Under concurrent calls with the same username exactly one succeeds;
    /// all others observe `AlreadyExists`. The store assigns the identifier.
    ///
    /// # Errors
    /// * `AlreadyExists` - Username is already registered
    /// * `Unavailable` - Storage operation failed
    async fn insert_if_absent(
        &self,
        username: &Username,
        credential_hash: &CredentialHash,
    ) -> Result<Identity, StoreError>;
}
