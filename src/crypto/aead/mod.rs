//! # AES-256-GCM AEAD Module
//!
//! Authenticated encryption fixed by the wire format: AES-256-GCM with a
//! 12-byte IV and a 16-byte authentication tag.
//!
//! ## Components
//!
//! - [`AeadKey`]: 32-byte AES-256 key (zeroizes on drop)
//! - [`AeadIv`]: 12-byte IV
//! - [`AuthTag`]: 16-byte authentication tag
//! - [`AeadCipher`]: encrypt/decrypt operations
//!
//! ## Example
//!
//! ```
//! use confcrypt_core::crypto::aead::{AeadCipher, AeadKey, AeadIv};
//!
//! let key = AeadKey::from_bytes(&[0x42u8; 32]).unwrap();
//! let iv = AeadIv::from_bytes(&[0x01u8; 12]).unwrap();
//! let cipher = AeadCipher::new(&key);
//!
//! let ciphertext = cipher.encrypt(&iv, b"frame payload", b"aad").unwrap();
//! let plaintext = cipher.decrypt(&iv, &ciphertext, b"aad").unwrap();
//! assert_eq!(plaintext, b"frame payload");
//! ```

use crate::crypto::error::{CryptoError, Result};
use aes_gcm::aead::{Aead, AeadInPlace, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// IV size in bytes, fixed by the wire format.
pub const NONCE_SIZE: usize = 12;
/// Key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;
/// Authentication tag size in bytes, fixed by the wire format.
pub const TAG_SIZE: usize = 16;

/// 256-bit AES-GCM key.
///
/// Automatically zeroizes on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AeadKey([u8; KEY_SIZE]);

impl AeadKey {
    /// Create from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// 12-byte AES-GCM IV.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AeadIv(pub [u8; NONCE_SIZE]);

impl AeadIv {
    /// Create from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: NONCE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut iv = [0u8; NONCE_SIZE];
        iv.copy_from_slice(bytes);
        Ok(Self(iv))
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// 16-byte AES-GCM authentication tag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AuthTag(pub [u8; TAG_SIZE]);

impl AuthTag {
    /// Get the tag bytes.
    pub fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }
}

/// AES-256-GCM authenticated encryption.
///
/// Holds an initialized cipher instance bound to a single key. IVs are
/// supplied per-call by the caller, which is responsible for never
/// reusing an IV under the same key.
pub struct AeadCipher {
    cipher: Aes256Gcm,
}

impl AeadCipher {
    /// Create a new cipher bound to `key`.
    pub fn new(key: &AeadKey) -> Self {
        Self {
            cipher: Aes256Gcm::new_from_slice(key.as_bytes())
                .expect("AES-256-GCM key is always exactly KEY_SIZE bytes"),
        }
    }

    /// Encrypt `plaintext` under `iv`, authenticating `aad`.
    ///
    /// Returns ciphertext with the 16-byte tag appended.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if the underlying cipher fails.
    pub fn encrypt(&self, iv: &AeadIv, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(&iv.0);
        self.cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::aead("AES-256-GCM encryption failed"))
    }

    /// Decrypt `ciphertext` (with trailing 16-byte tag) under `iv`,
    /// verifying `aad`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if `ciphertext` is shorter than
    /// the tag, or if authentication fails (tampering detected).
    pub fn decrypt(&self, iv: &AeadIv, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::aead("ciphertext shorter than authentication tag"));
        }
        let nonce = Nonce::from_slice(&iv.0);
        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::aead("AES-256-GCM decryption failed: authentication failure"))
    }

    /// Encrypt `buffer` in place under `iv`, authenticating `aad`.
    ///
    /// On success, `buffer` holds the ciphertext and the 16-byte tag is
    /// returned separately.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if the underlying cipher fails.
    pub fn encrypt_in_place(&self, iv: &AeadIv, buffer: &mut Vec<u8>, aad: &[u8]) -> Result<AuthTag> {
        let nonce = Nonce::from_slice(&iv.0);
        let tag = self
            .cipher
            .encrypt_in_place_detached(nonce, aad, buffer)
            .map_err(|_| CryptoError::aead("AES-256-GCM in-place encryption failed"))?;
        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(&tag);
        Ok(AuthTag(tag_bytes))
    }

    /// Decrypt `buffer` in place under `iv`, verifying `tag` and `aad`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AeadError` if authentication fails.
    pub fn decrypt_in_place(
        &self,
        iv: &AeadIv,
        buffer: &mut Vec<u8>,
        tag: &AuthTag,
        aad: &[u8],
    ) -> Result<()> {
        let nonce = Nonce::from_slice(&iv.0);
        let tag = aes_gcm::Tag::from_slice(&tag.0);
        self.cipher
            .decrypt_in_place_detached(nonce, aad, buffer, tag)
            .map_err(|_| {
                CryptoError::aead("AES-256-GCM in-place decryption failed: authentication failure")
            })
    }
}
