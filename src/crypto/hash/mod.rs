//! # BLAKE3 Hash Module
//!
//! This module provides BLAKE3 hashing and key derivation functionality.
//!
//! ## Components
//!
//! - [`HashOutput`]: 32-byte hash output type (implements `Zeroize`)
//! - [`Blake3Hasher`]: Incremental hasher with update/finalize API
//! - [`hash`]: One-shot convenience function
//! - [`DeriveKey`]: BLAKE3-based key derivation with domain separation

mod blake3;

use zeroize::{Zeroize, ZeroizeOnDrop};

// Re-export all public items from the blake3 submodule
pub use self::blake3::{hash, Blake3Hasher, DeriveKey};

/// 32-byte BLAKE3 hash output.
///
/// This newtype wrapper prevents accidental misuse with other 32-byte types.
/// Implements [`Zeroize`] and [`ZeroizeOnDrop`] to ensure hash values
/// used as key material are securely erased from memory.
///
/// Note: `HashOutput` is intentionally not `Copy` because it implements
/// `ZeroizeOnDrop`.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct HashOutput([u8; 32]);

impl HashOutput {
    /// Create a new `HashOutput` from a 32-byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get a reference to the underlying 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode the hash as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for HashOutput {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
