use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::identity::errors::StoreError;
use crate::identity::models::CredentialHash;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::Username;
use crate::identity::ports::CredentialStore;

/// Process-local credential store, keyed by exact username.
///
/// Used by the `memory` storage backend and by tests. Contents are lost on
/// restart.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &Username) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.read().await.get(username.as_str()).cloned())
    }

    async fn insert_if_absent(
        &self,
        username: &Username,
        credential_hash: &CredentialHash,
    ) -> Result<Identity, StoreError> {
        // Check and insert under one write guard.
        let mut identities = self.identities.write().await;

        match identities.entry(username.as_str().to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(username.as_str().to_string())),
            Entry::Vacant(slot) => {
                let identity = Identity {
                    id: IdentityId::new(),
                    username: username.clone(),
                    credential_hash: credential_hash.clone(),
                    created_at: Utc::now(),
                };
                slot.insert(identity.clone());
                Ok(identity)
            }
        }
    }
}
