//! Symmetric encryption of sensitive card fields
//!
//! Fields are sealed with AES-256-GCM. The 256-bit key is the SHA-256 digest
//! of the configured key string, so any non-empty secret can be used.
//!
//! Stored layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::core::error::CipherError;

const NONCE_LEN: usize = 12;
const FINGERPRINT_CONTEXT: &[u8] = b"card-manager/card-number-fingerprint";

/// Encrypts and decrypts individual string fields
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
    fingerprint_key: [u8; 32],
}

impl FieldCipher {
    /// Build a cipher from the configured secret.
    pub fn new(secret: &str) -> Result<Self, CipherError> {
        if secret.is_empty() {
            return Err(CipherError::InvalidKey);
        }

        let key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        let fingerprint_key: [u8; 32] = Sha256::new()
            .chain_update(FINGERPRINT_CONTEXT)
            .chain_update(key)
            .finalize()
            .into();

        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
            fingerprint_key,
        })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt a value produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, sealed: &[u8]) -> Result<String, CipherError> {
        if sealed.len() < NONCE_LEN {
            return Err(CipherError::Decrypt);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }

    /// Keyed digest used to enforce card-number uniqueness at rest.
    ///
    /// Deterministic for a given key, unlike [`encrypt`](Self::encrypt).
    pub fn fingerprint(&self, plaintext: &str) -> Vec<u8> {
        Sha256::new()
            .chain_update(self.fingerprint_key)
            .chain_update(plaintext.as_bytes())
            .finalize()
            .to_vec()
    }
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}
