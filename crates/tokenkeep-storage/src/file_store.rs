use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use tokenkeep_core::{Credential, CredentialError, CredentialStore};
use tokio::fs;
use tracing::{debug, instrument};

use crate::{
    codec,
    key::EncryptionKey,
    paths::{self, PathEnvironment},
};

/// File-backed store implementing the shared `CredentialStore` contract.
/// One file per storage key inside the namespace directory; contents are an
/// encrypted envelope when a key is configured and canonical plaintext otherwise.
pub struct FileCredentialStore {
    root: PathBuf,
    key: Option<EncryptionKey>,
}

impl FileCredentialStore {
    /// Open the store for `namespace` in the host's platform directory.
    ///
    /// An empty `encryption_key` means plaintext mode. Any other key must be
    /// exactly 32 bytes; that is checked before any filesystem access.
    pub async fn new(namespace: &str, encryption_key: Option<&str>) -> Result<Self, CredentialError> {
        Self::with_environment(namespace, encryption_key, &PathEnvironment::from_host()).await
    }

    /// Like [`FileCredentialStore::new`] with an injected path environment.
    pub async fn with_environment(
        namespace: &str,
        encryption_key: Option<&str>,
        env: &PathEnvironment,
    ) -> Result<Self, CredentialError> {
        let key = parse_key(encryption_key)?;
        let root = paths::resolve_base_dir(namespace, env)?;
        Self::open(root, key).await
    }

    /// Open a store rooted at an explicit directory, creating it if absent.
    pub async fn open(
        root: impl Into<PathBuf>,
        key: Option<EncryptionKey>,
    ) -> Result<Self, CredentialError> {
        let root = root.into();
        debug!(?root, encrypted = key.is_some(), "initializing credential store");
        fs::create_dir_all(&root).await?;
        Ok(Self { root, key })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CredentialError> {
        validate_storage_key(key)?;
        Ok(self.root.join(key))
    }

    fn encode(&self, credential: &Credential) -> Result<String, CredentialError> {
        match &self.key {
            Some(key) => codec::encrypt(credential, key),
            None => credential.to_canonical(),
        }
    }

    fn decode(&self, contents: Vec<u8>) -> Result<Credential, CredentialError> {
        let text = String::from_utf8(contents).map_err(|e| match &self.key {
            Some(_) => CredentialError::InvalidEnvelope {
                reason: format!("not UTF-8 text: {e}"),
            },
            None => CredentialError::MalformedRecord {
                reason: format!("not UTF-8 text: {e}"),
            },
        })?;

        match &self.key {
            Some(key) => codec::decrypt(&text, key),
            None => Credential::from_canonical(&text),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    #[instrument(skip_all, fields(key = %key))]
    async fn get_credential(&self, key: &str) -> Result<Option<Credential>, CredentialError> {
        let path = self.path_for(key)?;
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no credential stored");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        self.decode(contents).map(Some)
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn store_credential(
        &self,
        key: &str,
        credential: &Credential,
    ) -> Result<(), CredentialError> {
        let path = self.path_for(key)?;
        let contents = self.encode(credential)?;
        fs::write(&path, contents).await?;
        debug!("credential stored");
        Ok(())
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn remove_credential(&self, key: &str) -> Result<(), CredentialError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_key(encryption_key: Option<&str>) -> Result<Option<EncryptionKey>, CredentialError> {
    match encryption_key {
        None | Some("") => Ok(None),
        Some(secret) => EncryptionKey::from_secret(secret).map(Some),
    }
}

/// A storage key must name exactly one file directly inside the store directory.
fn validate_storage_key(key: &str) -> Result<(), CredentialError> {
    let mut components = Path::new(key).components();
    let single_segment = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(segment)), None) if segment == key
    );

    if single_segment && !key.contains('\0') {
        Ok(())
    } else {
        Err(CredentialError::InvalidStorageKey {
            key: key.to_string(),
        })
    }
}
