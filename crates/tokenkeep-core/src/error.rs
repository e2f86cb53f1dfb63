use thiserror::Error;

/// Errors produced by credential stores and the pieces they are built from.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Host OS has no known credential directory and no override was given.
    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },
    /// The platform base directory needs a home directory that could not be found.
    #[error("home directory is not available")]
    HomeDirUnavailable,
    /// Namespace is not a single path segment.
    #[error("invalid namespace: {namespace:?}")]
    InvalidNamespace { namespace: String },
    /// Encryption key is not exactly the required length.
    #[error("invalid encryption key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    /// Storage key does not name exactly one file inside the store directory.
    #[error("invalid storage key: {key:?}")]
    InvalidStorageKey { key: String },
    /// Stored text lacks the `iv:ciphertext` structure.
    #[error("invalid envelope: {reason}")]
    InvalidEnvelope { reason: String },
    /// Cipher rejected the ciphertext (wrong key, corrupted or tampered data).
    #[error("decryption failed: {reason}")]
    DecryptionFailure { reason: String },
    /// Plaintext content is not a canonical credential record.
    #[error("malformed credential record: {reason}")]
    MalformedRecord { reason: String },
    /// Non-filesystem backend failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
