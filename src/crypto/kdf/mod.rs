//! # HKDF-SHA-256 Key Derivation Module
//!
//! Protocol-level key derivation built on HKDF-SHA-256 (RFC 5869). Two
//! operations live here:
//!
//! - [`derive_aead_key`]: combines two 32-byte shared secrets (one
//!   classical, one post-quantum) into a single 256-bit AES-GCM key.
//!   The argument order is significant — the function is not commutative
//!   — callers must pass secrets in the order the protocol step defines.
//! - [`ratchet_share`]: deterministically advances a 32-byte media-key
//!   share to its next value.
//!
//! BLAKE3 is used elsewhere in this crate (see `crypto::hash`) for
//! commitments and SAS material; this module exists because the wire
//! format fixes HKDF-SHA-256 specifically for these two derivations.

use crate::crypto::error::{CryptoError, Result};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};

/// Salt fixed by the wire format for `derive_aead_key`.
const AEAD_KEY_SALT: &[u8] = b"confcrypt-core/v1/aead-key-salt";

/// HKDF info label fixed by the wire format for `derive_aead_key`.
const AEAD_KEY_INFO: &[u8] = b"Derive AES Encryption Key";

/// Salt fixed by the wire format for `ratchet_share`.
const RATCHET_SALT: &[u8] = b"confcrypt-core/v1/ratchet-salt";

/// HKDF info label fixed by the wire format for `ratchet_share`.
const RATCHET_INFO: &[u8] = b"ratchet-share";

/// Marker type grouping the HKDF-SHA-256 derivation operations.
///
/// All operations are associated functions (no instance state), matching
/// the shape of the other primitive modules in this crate.
pub struct HkdfSha256;

impl HkdfSha256 {
    /// Derive a 256-bit AES-GCM key from two 32-byte shared secrets.
    ///
    /// Computes `HKDF-SHA-256(salt = AEAD_KEY_SALT, ikm = SHA-256(a ‖ b),
    /// info = "Derive AES Encryption Key", length = 32)`.
    ///
    /// `secret_a` and `secret_b` are concatenated in the order given —
    /// this function is **not commutative**. Callers must pass secrets
    /// in the order their protocol step defines (for example,
    /// first-received-secret, then locally-generated-secret).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KdfError` if either input is not exactly
    /// 32 bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::kdf::HkdfSha256;
    ///
    /// let a = [0x11u8; 32];
    /// let b = [0x22u8; 32];
    /// let key = HkdfSha256::derive_aead_key(&a, &b).unwrap();
    /// assert_eq!(key.len(), 32);
    /// ```
    pub fn derive_aead_key(secret_a: &[u8], secret_b: &[u8]) -> Result<[u8; 32]> {
        if secret_a.len() != 32 || secret_b.len() != 32 {
            return Err(CryptoError::kdf(
                "derive_aead_key requires two 32-byte shared secrets",
            ));
        }

        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(secret_a);
        concat.extend_from_slice(secret_b);

        let mut digest = Sha256::new();
        digest.update(&concat);
        let ikm = digest.finalize();

        use zeroize::Zeroize;
        concat.zeroize();

        let hk = Hkdf::<Sha256>::new(Some(AEAD_KEY_SALT), &ikm);
        let mut okm = [0u8; 32];
        hk.expand(AEAD_KEY_INFO, &mut okm)
            .map_err(|_| CryptoError::kdf("HKDF expand failed for derive_aead_key"))?;

        Ok(okm)
    }

    /// Deterministically advance a 32-byte media-key share to its next value.
    ///
    /// Computes `HKDF-SHA-256(salt = RATCHET_SALT, ikm = share,
    /// info = "ratchet-share", length = 32)`. Distinct inputs produce
    /// collision-free outputs (modulo the underlying hash's collision
    /// resistance).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KdfError` if `share` is not exactly 32 bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::kdf::HkdfSha256;
    ///
    /// let share = [0x42u8; 32];
    /// let next = HkdfSha256::ratchet_share(&share).unwrap();
    /// assert_ne!(next, share);
    /// ```
    pub fn ratchet_share(share: &[u8]) -> Result<[u8; 32]> {
        if share.len() != 32 {
            return Err(CryptoError::kdf("ratchet_share requires a 32-byte input"));
        }

        let hk = Hkdf::<Sha256>::new(Some(RATCHET_SALT), share);
        let mut okm = [0u8; 32];
        hk.expand(RATCHET_INFO, &mut okm)
            .map_err(|_| CryptoError::kdf("HKDF expand failed for ratchet_share"))?;

        Ok(okm)
    }
}
