use color_eyre::Result;
use tokenkeep_storage::{FileCredentialStore, PathEnvironment};
use tracing::debug;

use crate::config::{Config, ENCRYPTION_KEY_ENV};

/// Host path environment with the config's `storage_dir` filling in a missing override.
pub fn path_environment(config: &Config) -> PathEnvironment {
    apply_config_override(PathEnvironment::from_host(), config)
}

/// `TOKENKEEP_STORAGE_DIR` wins; `storage_dir` only applies when no override is set.
fn apply_config_override(mut env: PathEnvironment, config: &Config) -> PathEnvironment {
    if env.override_dir.is_none() {
        env.override_dir = config.storage_dir.clone();
    }
    env
}

/// Build the file store for a namespace using config and environment overrides.
pub async fn store_from_config(config: &Config, namespace: &str) -> Result<FileCredentialStore> {
    let env = path_environment(config);
    let key = config.resolve_encryption_key(std::env::var(ENCRYPTION_KEY_ENV).ok());
    let store = FileCredentialStore::with_environment(namespace, key.as_deref(), &env).await?;
    debug!(root = ?store.root(), encrypted = store.is_encrypted(), "credential store ready");
    Ok(store)
}

/// Helper for tests to construct an encrypted store rooted at a temp dir.
#[cfg(test)]
pub async fn test_store(root: impl Into<std::path::PathBuf>) -> FileCredentialStore {
    let key = tokenkeep_storage::EncryptionKey::from_secret("0123456789abcdef0123456789abcdef")
        .expect("valid test key");
    FileCredentialStore::open(root, Some(key))
        .await
        .expect("open test store")
}
