use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Identity token record persisted by credential stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// True once `now` has reached `expires_at`. Records without expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Canonical text form: compact JSON, fields in declaration order.
    pub fn to_canonical(&self) -> Result<String, CredentialError> {
        serde_json::to_string(self).map_err(|e| CredentialError::MalformedRecord {
            reason: e.to_string(),
        })
    }

    /// Parse the canonical text form back into a record.
    pub fn from_canonical(text: &str) -> Result<Self, CredentialError> {
        serde_json::from_str(text).map_err(|e| CredentialError::MalformedRecord {
            reason: e.to_string(),
        })
    }
}
