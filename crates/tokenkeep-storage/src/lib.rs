//! Filesystem credential storage with optional encryption at rest.
//! Records are AES-256-CBC encrypted into `iv:ciphertext` hex envelopes when
//! the caller supplies a key, and stored as canonical plaintext otherwise.

pub mod codec;
pub mod file_store;
pub mod key;
pub mod paths;

pub use file_store::FileCredentialStore;
pub use key::EncryptionKey;
pub use paths::{PathEnvironment, Platform, OVERRIDE_ENV};
