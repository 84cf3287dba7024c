use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::identity::errors::IdentityError;
use crate::identity::errors::StoreError;
use crate::identity::models::AuthenticatedIdentity;
use crate::identity::models::CredentialHash;
use crate::identity::models::IdentityId;
use crate::identity::models::IssuedToken;
use crate::identity::models::LoginCommand;
use crate::identity::models::RegisterCommand;
use crate::identity::models::RegisteredIdentity;
use crate::identity::ports::CredentialStore;
use crate::identity::ports::IdentityServicePort;

/// Domain service implementing registration, login and token resolution.
///
/// Holds no mutable state of its own: the authenticator is immutable and
/// uniqueness is delegated to the store's atomic insert.
pub struct IdentityService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
}

impl<CS> IdentityService<CS>
where
    CS: CredentialStore,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `authenticator` - Password hasher and token issuer holding the signing secret
    pub fn new(store: Arc<CS>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    /// Resolve a token as if the current time were `now`.
    pub fn resolve_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedIdentity, IdentityError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(IdentityError::Unauthenticated)?;

        let claims = self
            .authenticator
            .validate_token_at(token, now)
            .map_err(|e| {
                tracing::warn!(error = %e, "Token rejected");
                IdentityError::InvalidToken
            })?;

        let id = IdentityId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(error = %e, "Token subject is not an identity id");
            IdentityError::InvalidToken
        })?;

        Ok(AuthenticatedIdentity {
            id,
            username: claims.username,
        })
    }
}

#[async_trait]
impl<CS> IdentityServicePort for IdentityService<CS>
where
    CS: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<RegisteredIdentity, IdentityError> {
        let RegisterCommand { username, password } = command;

        // Hashing is deliberately slow; keep it off the async workers.
        let authenticator = Arc::clone(&self.authenticator);
        let credential_hash =
            tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
                .await
                .map_err(|e| IdentityError::Internal(format!("Hashing task failed: {}", e)))?
                .map_err(|e| {
                    tracing::error!(error = %e, "Password hashing failed");
                    IdentityError::Internal("Password hashing failed".to_string())
                })?;

        let identity = self
            .store
            .insert_if_absent(&username, &CredentialHash::new(credential_hash))
            .await
            .map_err(|e| {
                match &e {
                    StoreError::AlreadyExists(_) => {
                        tracing::info!(username = %username, "Registration rejected: username taken")
                    }
                    StoreError::Unavailable(reason) => {
                        tracing::error!(error = %reason, "Registration failed: store unavailable")
                    }
                }
                IdentityError::from(e)
            })?;

        tracing::info!(
            identity_id = %identity.id,
            username = %identity.username,
            "Identity registered"
        );

        Ok(identity.into())
    }

    async fn authenticate(&self, command: LoginCommand) -> Result<IssuedToken, IdentityError> {
        let LoginCommand { username, password } = command;

        let found = self
            .store
            .find_by_username(&username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Login failed: store unavailable");
                IdentityError::from(e)
            })?;

        let authenticator = Arc::clone(&self.authenticator);

        let Some(identity) = found else {
            // Pay the same hashing cost as a wrong password.
            tokio::task::spawn_blocking(move || authenticator.reject_unknown(password.expose()))
                .await
                .map_err(|e| IdentityError::Internal(format!("Verification task failed: {}", e)))?;

            tracing::warn!(username = %username, "Login failed: unknown username");
            return Err(IdentityError::InvalidCredentials);
        };

        let stored_hash = identity.credential_hash.clone();
        let identity_id = identity.id;
        let token_username = identity.username.clone();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(
                password.expose(),
                stored_hash.expose(),
                identity_id,
                token_username.as_str(),
            )
        })
        .await
        .map_err(|e| IdentityError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::warn!(username = %username, "Login failed: wrong password");
                IdentityError::InvalidCredentials
            }
            AuthenticationError::PasswordError(err) => {
                tracing::error!(
                    identity_id = %identity_id,
                    error = %err,
                    "Stored credential is unusable"
                );
                IdentityError::Internal("Password verification failed".to_string())
            }
            AuthenticationError::JwtError(err) => {
                tracing::error!(error = %err, "Token generation failed");
                IdentityError::Internal("Token generation failed".to_string())
            }
        })?;

        let expires_at = result.claims.expires_at().ok_or_else(|| {
            IdentityError::Internal("Token expiration out of range".to_string())
        })?;

        tracing::info!(identity_id = %identity.id, username = %identity.username, "Login succeeded");

        Ok(IssuedToken {
            token: result.access_token,
            identity_id: identity.id,
            username: identity.username,
            expires_at,
        })
    }

    fn resolve(&self, token: Option<&str>) -> Result<AuthenticatedIdentity, IdentityError> {
        self.resolve_at(token, Utc::now())
    }
}
