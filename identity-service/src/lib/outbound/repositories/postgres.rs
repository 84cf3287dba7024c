use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::identity::errors::StoreError;
use crate::identity::models::CredentialHash;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::Username;
use crate::identity::ports::CredentialStore;

const USERNAME_CONSTRAINT: &str = "users_username_key";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Report the server version string; startup uses it to confirm connectivity.
    pub async fn server_version(&self) -> Result<String, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        // Rows may predate the current username rules.
        Identity {
            id: IdentityId(row.id),
            username: Username::from_stored(row.username),
            credential_hash: CredentialHash::new(row.password_hash),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_username(&self, username: &Username) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(Identity::from))
    }

    async fn insert_if_absent(
        &self,
        username: &Username,
        credential_hash: &CredentialHash,
    ) -> Result<Identity, StoreError> {
        // The unique constraint arbitrates concurrent inserts; the loser gets no row back.
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username.as_str())
        .bind(credential_hash.expose())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_CONSTRAINT)
                {
                    return StoreError::AlreadyExists(username.as_str().to_string());
                }
            }
            StoreError::Unavailable(e.to_string())
        })?;

        match row {
            Some(row) => Ok(Identity::from(row)),
            None => Err(StoreError::AlreadyExists(username.as_str().to_string())),
        }
    }
}
