use std::fmt;

use tokenkeep_core::CredentialError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Required key length for AES-256.
pub const KEY_LEN: usize = 32;

/// Caller-supplied 256-bit symmetric key. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Build a key from raw bytes, which must be exactly 32 long.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, CredentialError> {
        let bytes = bytes.as_ref();
        if bytes.len() != KEY_LEN {
            return Err(CredentialError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        }

        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(bytes);
        Ok(Self { bytes: out })
    }

    /// Build a key from a secret string; its UTF-8 bytes are the key material.
    pub fn from_secret(secret: &str) -> Result<Self, CredentialError> {
        Self::from_bytes(secret.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

// never print key bytes
impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_32_characters() {
        let key = EncryptionKey::from_secret(&"a".repeat(32)).expect("valid key");
        assert_eq!(key.as_bytes(), &[b'a'; 32]);
    }

    #[test]
    fn rejects_wrong_length() {
        for len in [0, 16, 31, 33, 64] {
            let err = EncryptionKey::from_bytes(vec![7u8; len]).expect_err("should reject");
            assert!(matches!(
                err,
                CredentialError::InvalidKeyLength {
                    expected: 32,
                    actual
                } if actual == len
            ));
        }
    }

    #[test]
    fn length_counts_bytes_not_characters() {
        // 32 characters, 64 bytes
        let err = EncryptionKey::from_secret(&"é".repeat(32)).expect_err("should reject");
        assert!(matches!(
            err,
            CredentialError::InvalidKeyLength { actual: 64, .. }
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = EncryptionKey::from_secret(&"s".repeat(32)).expect("valid key");
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("115"));
        assert!(!rendered.contains("sss"));
    }
}
