//! # Cryptographic Primitives Module
//!
//! This module provides type-safe, memory-safe cryptographic primitives
//! for the conference end-to-end encryption core.
//!
//! ## Design Principles
//!
//! 1. **Type Safety**: All key types are newtype wrappers preventing misuse
//! 2. **Memory Safety**: All secret keys implement `Zeroize`
//! 3. **Minimal Explicit**: Complex parameters have safe defaults
//! 4. **Testability**: Every primitive has comprehensive test vectors
//!
//! ## Module Structure
//!
//! - `error` - Unified error types for all crypto operations
//! - `hash` - BLAKE3 hashing, used for commitments and SAS bit derivation
//! - `kdf` - HKDF-SHA-256 derivation for AEAD keys and ratchet shares
//! - `aead` - AES-256-GCM authenticated encryption
//! - `kem` - Kyber-512 post-quantum key encapsulation
//! - `ecdh` - X25519 elliptic curve Diffie-Hellman
//! - `sas` - Short authentication string (emoji) derivation
//! - `commitment` - Identity/media-key commitments and SAS participant-state hashing

// Error handling
pub mod error;

// Cryptographic primitives
pub mod aead;
pub mod commitment;
pub mod ecdh;
pub mod hash;
pub mod kdf;
pub mod kem;
pub mod sas;

// Re-export common types at the crypto module level
pub use error::{CryptoError, Result};

// Re-export hash types
pub use hash::{hash as blake3_hash, Blake3Hasher, DeriveKey, HashOutput};

// Re-export KDF types
pub use kdf::HkdfSha256;

// Re-export AEAD types
pub use aead::{AeadCipher, AeadKey, AeadIv, AuthTag};

// Re-export KEM types
pub use kem::{
    KyberCipherText, KyberKEM, KyberKeyPair, KyberPublicKeyBytes, KyberSecretKeyBytes,
    KyberSharedSecret,
};

// Re-export ECDH types
pub use ecdh::{EcdhSharedSecret, X25519KeyPair, X25519PublicKeyBytes, X25519SecretKeyBytes, X25519ECDH};

// Re-export SAS types
pub use sas::{derive_sas_bits, sas_emojis, SasIndices};

// Re-export commitment functions
pub use commitment::{commit_identity, commit_media_key, hash_participant_state};
