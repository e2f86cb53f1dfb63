use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{credential::Credential, error::CredentialError};

/// Contract for credential persistence, addressed by an opaque storage key.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve the credential for a key; `None` when nothing is stored.
    async fn get_credential(&self, key: &str) -> Result<Option<Credential>, CredentialError>;

    /// Persist a credential under a key, overwriting any existing entry.
    async fn store_credential(
        &self,
        key: &str,
        credential: &Credential,
    ) -> Result<(), CredentialError>;

    /// Remove a key and its credential (idempotent).
    async fn remove_credential(&self, key: &str) -> Result<(), CredentialError>;
}

/// In-memory store for tests and ephemeral sessions.
/// Entries are kept in canonical text form so they go through the same
/// serializer as on-disk records.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCredentialStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_credential(&self, key: &str) -> Result<Option<Credential>, CredentialError> {
        let map = self.inner.lock().map_err(|err| CredentialError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;

        map.get(key)
            .map(|text| Credential::from_canonical(text))
            .transpose()
    }

    async fn store_credential(
        &self,
        key: &str,
        credential: &Credential,
    ) -> Result<(), CredentialError> {
        let text = credential.to_canonical()?;
        let mut map = self.inner.lock().map_err(|err| CredentialError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), text);
        Ok(())
    }

    async fn remove_credential(&self, key: &str) -> Result<(), CredentialError> {
        let mut map = self.inner.lock().map_err(|err| CredentialError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lifecycle_get_store_remove() {
        let store = InMemoryCredentialStore::new();
        let credential = Credential::new("1", "test-token");

        assert_eq!(store.get_credential("x").await.expect("get"), None);

        store
            .store_credential("x", &credential)
            .await
            .expect("store should succeed");
        assert_eq!(
            store.get_credential("x").await.expect("get"),
            Some(credential)
        );

        store.remove_credential("x").await.expect("remove");
        assert_eq!(store.get_credential("x").await.expect("get"), None);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryCredentialStore::new();
        store
            .remove_credential("missing")
            .await
            .expect("remove of missing key should succeed");
    }

    #[tokio::test]
    async fn store_overwrites_existing_entry() {
        let store = InMemoryCredentialStore::new();
        store
            .store_credential("k", &Credential::new("1", "old"))
            .await
            .expect("store");
        store
            .store_credential("k", &Credential::new("1", "new"))
            .await
            .expect("store again");

        let current = store.get_credential("k").await.expect("get").expect("present");
        assert_eq!(current.token, "new");
    }
}
