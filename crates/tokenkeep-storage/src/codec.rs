//! AES-256-CBC envelope codec.
//!
//! Envelope format: `{iv_hex}:{ciphertext_hex}`
//! - IV: 16 random bytes, fresh per call
//! - Ciphertext: AES-256-CBC with PKCS#7 padding over the canonical record text
//!
//! CBC carries no authentication tag. Anything the cipher accepts but that does
//! not decode to a canonical record is reported as a decryption failure.

use std::{fmt, str::FromStr};

use aes::{
    cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit},
    Aes256,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tokenkeep_core::{Credential, CredentialError};

use crate::key::EncryptionKey;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const IV_LEN: usize = 16;

const SEPARATOR: char = ':';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
    #[error("decryption failed: {0}")]
    DecryptionFailure(String),
    #[error("encryption failed: {0}")]
    EncryptionFailure(String),
}

impl From<CodecError> for CredentialError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidEnvelope(reason) => CredentialError::InvalidEnvelope { reason },
            CodecError::DecryptionFailure(reason) => {
                CredentialError::DecryptionFailure { reason }
            }
            CodecError::EncryptionFailure(reason) => CredentialError::Storage { reason },
        }
    }
}

/// Parsed `iv:ciphertext` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            hex::encode(self.iv),
            hex::encode(&self.ciphertext)
        )
    }
}

impl FromStr for Envelope {
    type Err = CodecError;

    /// The first segment is the IV; everything after the first separator is ciphertext.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (iv_hex, ciphertext_hex) = s.trim().split_once(SEPARATOR).ok_or_else(|| {
            CodecError::InvalidEnvelope("expected iv:ciphertext".to_string())
        })?;

        let iv_bytes = hex::decode(iv_hex)
            .map_err(|e| CodecError::InvalidEnvelope(format!("invalid IV hex: {e}")))?;
        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|e| CodecError::InvalidEnvelope(format!("invalid ciphertext hex: {e}")))?;

        let iv: [u8; IV_LEN] = iv_bytes.as_slice().try_into().map_err(|_| {
            CodecError::InvalidEnvelope(format!(
                "invalid IV length: expected {IV_LEN}, got {}",
                iv_bytes.len()
            ))
        })?;

        Ok(Self { iv, ciphertext })
    }
}

/// Serialize and encrypt a credential into an envelope string.
pub fn encrypt(credential: &Credential, key: &EncryptionKey) -> Result<String, CredentialError> {
    let plaintext = credential.to_canonical()?;
    Ok(seal(plaintext.as_bytes(), key)?.to_string())
}

/// Decrypt an envelope string and parse the record it carries.
pub fn decrypt(envelope: &str, key: &EncryptionKey) -> Result<Credential, CredentialError> {
    let envelope: Envelope = envelope.parse()?;
    let plaintext = open(&envelope, key)?;

    let text = String::from_utf8(plaintext).map_err(|_| {
        CodecError::DecryptionFailure("plaintext is not valid UTF-8".to_string())
    })?;
    Credential::from_canonical(&text).map_err(|_| {
        CredentialError::from(CodecError::DecryptionFailure(
            "plaintext is not a credential record".to_string(),
        ))
    })
}

fn seal(plaintext: &[u8], key: &EncryptionKey) -> Result<Envelope, CodecError> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| CodecError::EncryptionFailure(format!("cipher init failed: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(Envelope { iv, ciphertext })
}

fn open(envelope: &Envelope, key: &EncryptionKey) -> Result<Vec<u8>, CodecError> {
    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &envelope.iv)
        .map_err(|e| CodecError::DecryptionFailure(format!("cipher init failed: {e}")))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|e| CodecError::DecryptionFailure(e.to_string()))
}
