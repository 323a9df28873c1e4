//! # Kyber-512 KEM Module
//!
//! This module provides post-quantum key encapsulation using Kyber-512
//! (ML-KEM) via the PQClean reference implementation.
//!
//! ## Components
//!
//! - `KyberPublicKeyBytes`: 800-byte public key
//! - `KyberSecretKeyBytes`: 1632-byte secret key (zeroizes on drop)
//! - `KyberCipherText`: 768-byte encapsulated ciphertext
//! - `KyberSharedSecret`: 32-byte shared secret (zeroizes on drop)
//! - `KyberKeyPair`: Public/secret key pair
//! - `KyberKEM`: Encapsulation/decapsulation operations
//!
//! ## Key Sizes (pqcrypto-kyber 0.8.1 / PQClean, ML-KEM-512 / NIST level 1)
//!
//! | Parameter    | Size (bytes) |
//! |-------------|-------------|
//! | Public key  | 800         |
//! | Secret key  | 1632        |
//! | Ciphertext  | 768         |
//! | Shared secret | 32        |
//!
//! ## Example
//!
//! ```
//! use confcrypt_core::crypto::kem::{KyberKEM, KyberKeyPair};
//!
//! let keypair = KyberKEM::generate_keypair();
//! let (ss1, ct) = KyberKEM::encapsulate(&keypair.public).unwrap();
//! let ss2 = KyberKEM::decapsulate(&keypair.secret, &ct).unwrap();
//! assert_eq!(ss1.as_bytes(), ss2.as_bytes());
//! ```

mod kyber;

use zeroize::{Zeroize, ZeroizeOnDrop};

pub use kyber::{CIPHERTEXT_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SHARED_SECRET_SIZE};

/// Kyber-512 public key (800 bytes, PQClean)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KyberPublicKeyBytes(pub [u8; PUBLIC_KEY_SIZE]);

impl KyberPublicKeyBytes {
    /// Create from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::crypto::error::CryptoError> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(crate::crypto::error::CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; PUBLIC_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }
}

/// Kyber-512 secret key (1632 bytes, PQClean)
///
/// Automatically zeroizes on drop to prevent secret key material
/// from persisting in memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KyberSecretKeyBytes(pub [u8; SECRET_KEY_SIZE]);

impl KyberSecretKeyBytes {
    /// Create from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::crypto::error::CryptoError> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(crate::crypto::error::CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; SECRET_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.0
    }
}

/// Kyber-512 encapsulated ciphertext (768 bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct KyberCipherText(pub [u8; CIPHERTEXT_SIZE]);

impl KyberCipherText {
    /// Create from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::crypto::error::CryptoError> {
        if bytes.len() != CIPHERTEXT_SIZE {
            return Err(crate::crypto::error::CryptoError::InvalidKeyLength {
                expected: CIPHERTEXT_SIZE,
                actual: bytes.len(),
            });
        }
        let mut ct = [0u8; CIPHERTEXT_SIZE];
        ct.copy_from_slice(bytes);
        Ok(Self(ct))
    }

    /// Get the ciphertext bytes.
    pub fn as_bytes(&self) -> &[u8; CIPHERTEXT_SIZE] {
        &self.0
    }
}

/// Kyber-512 shared secret (32 bytes)
///
/// Automatically zeroizes on drop to prevent shared secret material
/// from persisting in memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KyberSharedSecret(pub [u8; SHARED_SECRET_SIZE]);

impl KyberSharedSecret {
    /// Create from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` if the slice length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::crypto::error::CryptoError> {
        if bytes.len() != SHARED_SECRET_SIZE {
            return Err(crate::crypto::error::CryptoError::InvalidKeyLength {
                expected: SHARED_SECRET_SIZE,
                actual: bytes.len(),
            });
        }
        let mut secret = [0u8; SHARED_SECRET_SIZE];
        secret.copy_from_slice(bytes);
        Ok(Self(secret))
    }

    /// Get the secret bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }
}

/// Kyber-512 key pair containing public and secret keys.
pub struct KyberKeyPair {
    /// The public key (safe to share, published via presence/signalling)
    pub public: KyberPublicKeyBytes,
    /// The secret key (must be kept private, zeroizes on drop)
    pub secret: KyberSecretKeyBytes,
}

/// Kyber-512 KEM operations.
///
/// Provides key generation, encapsulation, and decapsulation using the
/// Kyber-512 post-quantum key encapsulation mechanism. All operations are
/// implemented as associated functions (no instance state).
pub struct KyberKEM;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_from_bytes_valid() {
        let bytes = [0u8; PUBLIC_KEY_SIZE];
        let key = KyberPublicKeyBytes::from_bytes(&bytes).unwrap();
        assert_eq!(key.as_bytes().len(), PUBLIC_KEY_SIZE);
    }

    #[test]
    fn test_public_key_from_bytes_invalid_length() {
        let result = KyberPublicKeyBytes::from_bytes(&[0u8; 100]);
        assert!(result.is_err());
        match result.unwrap_err() {
            crate::crypto::error::CryptoError::InvalidKeyLength { expected, actual } => {
                assert_eq!(expected, PUBLIC_KEY_SIZE);
                assert_eq!(actual, 100);
            }
            _ => panic!("Expected InvalidKeyLength error"),
        }
    }

    #[test]
    fn test_secret_key_from_bytes_valid() {
        let bytes = [0u8; SECRET_KEY_SIZE];
        let key = KyberSecretKeyBytes::from_bytes(&bytes).unwrap();
        assert_eq!(key.as_bytes().len(), SECRET_KEY_SIZE);
    }

    #[test]
    fn test_secret_key_from_bytes_invalid_length() {
        let result = KyberSecretKeyBytes::from_bytes(&[0u8; 100]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ciphertext_from_bytes_valid() {
        let bytes = [0u8; CIPHERTEXT_SIZE];
        let ct = KyberCipherText::from_bytes(&bytes).unwrap();
        assert_eq!(ct.as_bytes().len(), CIPHERTEXT_SIZE);
    }

    #[test]
    fn test_ciphertext_from_bytes_invalid_length() {
        let result = KyberCipherText::from_bytes(&[0u8; 100]);
        assert!(result.is_err());
    }

    #[test]
    fn test_shared_secret_from_bytes_valid() {
        let bytes = [0u8; 32];
        let ss = KyberSharedSecret::from_bytes(&bytes).unwrap();
        assert_eq!(ss.as_bytes().len(), 32);
    }

    #[test]
    fn test_shared_secret_from_bytes_invalid_length() {
        let result = KyberSharedSecret::from_bytes(&[0u8; 16]);
        assert!(result.is_err());
    }
}
