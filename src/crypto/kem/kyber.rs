//! # Kyber-512 KEM Implementation
//!
//! Provides post-quantum key encapsulation using Kyber-512 (ML-KEM)
//! via the PQClean reference implementation.
//!
//! ## Security Properties
//!
//! - **NIST Level 1** security (equivalent to AES-128)
//! - 800-byte public key, 1632-byte secret key
//! - 768-byte ciphertext, 32-byte shared secret
//! - IND-CCA2 secure key encapsulation
//! - All secret keys implement `Zeroize` for automatic memory cleanup
//!
//! ## Usage
//!
//! ```
//! use confcrypt_core::crypto::kem::{KyberKEM, KyberKeyPair};
//!
//! // Generate a keypair
//! let keypair = KyberKEM::generate_keypair();
//!
//! // Sender encapsulates a shared secret
//! let (shared_secret, ciphertext) = KyberKEM::encapsulate(&keypair.public).unwrap();
//!
//! // Recipient decapsulates
//! let recovered = KyberKEM::decapsulate(&keypair.secret, &ciphertext).unwrap();
//! assert_eq!(shared_secret.as_bytes(), recovered.as_bytes());
//! ```

use super::{
    KyberCipherText, KyberKEM, KyberKeyPair, KyberPublicKeyBytes, KyberSecretKeyBytes,
    KyberSharedSecret,
};
use crate::crypto::error::{CryptoError, Result};
use pqcrypto_kyber::kyber512;
use pqcrypto_traits::kem::{
    Ciphertext as CiphertextTrait, PublicKey as PublicKeyTrait, SecretKey as SecretKeyTrait,
    SharedSecret as SharedSecretTrait,
};

/// Kyber-512 public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 800;

/// Kyber-512 secret key size in bytes
pub const SECRET_KEY_SIZE: usize = 1632;

/// Kyber-512 ciphertext size in bytes
pub const CIPHERTEXT_SIZE: usize = 768;

/// Kyber-512 shared secret size in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

impl KyberKEM {
    /// Generate a new Kyber-512 keypair using the system CSPRNG.
    ///
    /// This is the recommended way to create Kyber keypairs. The underlying
    /// implementation uses PQClean's reference C code compiled from source.
    ///
    /// # Returns
    ///
    /// A `KyberKeyPair` containing the public and secret keys.
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::kem::KyberKEM;
    ///
    /// let keypair = KyberKEM::generate_keypair();
    /// ```
    pub fn generate_keypair() -> KyberKeyPair {
        let (pk, sk) = kyber512::keypair();

        let pk_bytes = PublicKeyTrait::as_bytes(&pk);
        let sk_bytes = SecretKeyTrait::as_bytes(&sk);

        let mut pub_arr = [0u8; PUBLIC_KEY_SIZE];
        pub_arr.copy_from_slice(pk_bytes);

        let mut sec_arr = [0u8; SECRET_KEY_SIZE];
        sec_arr.copy_from_slice(sk_bytes);

        KyberKeyPair {
            public: KyberPublicKeyBytes(pub_arr),
            secret: KyberSecretKeyBytes(sec_arr),
        }
    }

    /// Encapsulate a shared secret using the recipient's public key.
    ///
    /// The sender calls this function with the recipient's public key to
    /// produce a shared secret and a ciphertext. The ciphertext is sent
    /// to the recipient who can recover the shared secret using their
    /// secret key.
    ///
    /// # Arguments
    ///
    /// - `public_key`: The recipient's Kyber-512 public key
    ///
    /// # Returns
    ///
    /// A tuple of `(KyberSharedSecret, KyberCipherText)` on success.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KemError` if encapsulation fails.
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::kem::KyberKEM;
    ///
    /// let keypair = KyberKEM::generate_keypair();
    /// let (shared_secret, ciphertext) = KyberKEM::encapsulate(&keypair.public).unwrap();
    /// ```
    pub fn encapsulate(
        public_key: &KyberPublicKeyBytes,
    ) -> Result<(KyberSharedSecret, KyberCipherText)> {
        let pk = PublicKeyTrait::from_bytes(&public_key.0).map_err(|e| {
            CryptoError::kem(format!("Invalid public key for encapsulation: {}", e))
        })?;

        let (ss, ct) = kyber512::encapsulate(&pk);

        let ss_bytes = SharedSecretTrait::as_bytes(&ss);
        let ct_bytes = CiphertextTrait::as_bytes(&ct);

        let mut secret_arr = [0u8; SHARED_SECRET_SIZE];
        secret_arr.copy_from_slice(ss_bytes);

        let mut ct_arr = [0u8; CIPHERTEXT_SIZE];
        ct_arr.copy_from_slice(ct_bytes);

        Ok((KyberSharedSecret(secret_arr), KyberCipherText(ct_arr)))
    }

    /// Decapsulate a shared secret from a ciphertext using the secret key.
    ///
    /// The recipient calls this function with their secret key and the
    /// ciphertext received from the sender to recover the shared secret.
    ///
    /// # Arguments
    ///
    /// - `secret_key`: The recipient's Kyber-512 secret key
    /// - `ciphertext`: The ciphertext produced by `encapsulate()`
    ///
    /// # Returns
    ///
    /// The recovered `KyberSharedSecret` on success.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KemError` if decapsulation fails.
    ///
    /// # Security Note
    ///
    /// Kyber's IND-CCA2 security means that a modified ciphertext will
    /// produce an implicit rejection (a random-looking shared secret that
    /// does not match the sender's). The caller should use the shared
    /// secret in a key-confirmation step to detect tampering.
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::kem::KyberKEM;
    ///
    /// let keypair = KyberKEM::generate_keypair();
    /// let (ss1, ct) = KyberKEM::encapsulate(&keypair.public).unwrap();
    /// let ss2 = KyberKEM::decapsulate(&keypair.secret, &ct).unwrap();
    /// assert_eq!(ss1.as_bytes(), ss2.as_bytes());
    /// ```
    pub fn decapsulate(
        secret_key: &KyberSecretKeyBytes,
        ciphertext: &KyberCipherText,
    ) -> Result<KyberSharedSecret> {
        let sk = SecretKeyTrait::from_bytes(&secret_key.0).map_err(|e| {
            CryptoError::kem(format!("Invalid secret key for decapsulation: {}", e))
        })?;

        let ct = CiphertextTrait::from_bytes(&ciphertext.0).map_err(|e| {
            CryptoError::kem(format!("Invalid ciphertext for decapsulation: {}", e))
        })?;

        let ss = kyber512::decapsulate(&ct, &sk);

        let ss_bytes = SharedSecretTrait::as_bytes(&ss);
        let mut secret_arr = [0u8; SHARED_SECRET_SIZE];
        secret_arr.copy_from_slice(ss_bytes);

        Ok(KyberSharedSecret(secret_arr))
    }
}


// ── Property-based tests (proptest) ──────────────────────────────
