//! Core abstractions for tokenkeep: the credential record, its canonical
//! text form, and the storage contract backends implement.

pub mod credential;
pub mod error;
pub mod store;

pub use credential::Credential;
pub use error::CredentialError;
pub use store::{CredentialStore, InMemoryCredentialStore};
