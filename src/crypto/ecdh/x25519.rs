//! # X25519 ECDH Implementation
//!
//! Provides elliptic curve Diffie-Hellman key exchange using X25519
//! via the x25519-dalek crate (v2.0.1).
//!
//! ## Security Properties
//!
//! - 128-bit security level (equivalent to AES-128)
//! - 32-byte public key, 32-byte secret key
//! - 32-byte shared secret
//! - Resistant to timing side-channel attacks (constant-time operations)
//! - All secret keys implement `Zeroize` for automatic memory cleanup
//!
//! ## Usage
//!
//! ```
//! use confcrypt_core::crypto::ecdh::{X25519ECDH, X25519KeyPair};
//!
//! // Alice generates a keypair
//! let alice = X25519ECDH::generate_keypair();
//!
//! // Bob generates a keypair
//! let bob = X25519ECDH::generate_keypair();
//!
//! // Both compute the shared secret
//! let ss_alice = X25519ECDH::diffie_hellman(&alice.secret, &bob.public).unwrap();
//! let ss_bob = X25519ECDH::diffie_hellman(&bob.secret, &alice.public).unwrap();
//! assert_eq!(ss_alice.as_bytes(), ss_bob.as_bytes());
//! ```

use super::{EcdhSharedSecret, X25519KeyPair, X25519PublicKeyBytes, X25519SecretKeyBytes, X25519ECDH};
use crate::crypto::error::{CryptoError, Result};

impl X25519ECDH {
    /// Generate a new X25519 keypair using the system CSPRNG.
    ///
    /// # Returns
    ///
    /// An `X25519KeyPair` containing the public and secret keys,
    /// both 32 bytes each.
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::ecdh::X25519ECDH;
    ///
    /// let keypair = X25519ECDH::generate_keypair();
    /// assert_eq!(keypair.public.as_bytes().len(), 32);
    /// ```
    pub fn generate_keypair() -> X25519KeyPair {
        let mut rng = rand::thread_rng();
        let secret = x25519_dalek::StaticSecret::random_from_rng(&mut rng);
        let public = x25519_dalek::PublicKey::from(&secret);

        X25519KeyPair {
            public: X25519PublicKeyBytes(public.to_bytes()),
            secret: X25519SecretKeyBytes(secret.to_bytes()),
        }
    }

    /// Perform Diffie-Hellman key agreement.
    ///
    /// Computes a shared secret from the local secret key and the
    /// remote party's public key. Both parties will derive the same
    /// shared secret when using their own secret key and the other's
    /// public key.
    ///
    /// # Arguments
    ///
    /// - `secret_key`: The local party's X25519 secret key
    /// - `public_key`: The remote party's X25519 public key
    ///
    /// # Returns
    ///
    /// A 32-byte `EcdhSharedSecret` on success.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EcdhError` if the resulting shared secret
    /// is all zeros, which indicates the remote public key is a
    /// low-order point (a potential small-subgroup attack).
    ///
    /// # Example
    ///
    /// ```
    /// use confcrypt_core::crypto::ecdh::X25519ECDH;
    ///
    /// let alice = X25519ECDH::generate_keypair();
    /// let bob = X25519ECDH::generate_keypair();
    ///
    /// let ss_a = X25519ECDH::diffie_hellman(&alice.secret, &bob.public).unwrap();
    /// let ss_b = X25519ECDH::diffie_hellman(&bob.secret, &alice.public).unwrap();
    /// assert_eq!(ss_a.as_bytes(), ss_b.as_bytes());
    /// ```
    pub fn diffie_hellman(
        secret_key: &X25519SecretKeyBytes,
        public_key: &X25519PublicKeyBytes,
    ) -> Result<EcdhSharedSecret> {
        let secret = x25519_dalek::StaticSecret::from(secret_key.0);
        let public = x25519_dalek::PublicKey::from(public_key.0);

        let shared = secret.diffie_hellman(&public);
        let shared_bytes = shared.to_bytes();

        // Reject all-zero shared secret (low-order point attack)
        if shared_bytes.iter().all(|&b| b == 0) {
            return Err(CryptoError::ecdh(
                "Shared secret is all zeros: possible low-order point attack",
            ));
        }

        Ok(EcdhSharedSecret(shared_bytes))
    }

    /// Derive the public key from a secret key.
    ///
    /// This is useful when reconstructing a keypair from a stored secret key.
    ///
    /// # Arguments
    ///
    /// - `secret_key`: The X25519 secret key
    ///
    /// # Returns
    ///
    /// The corresponding `X25519PublicKeyBytes`.
    pub fn public_from_secret(secret_key: &X25519SecretKeyBytes) -> X25519PublicKeyBytes {
        let secret = x25519_dalek::StaticSecret::from(secret_key.0);
        let public = x25519_dalek::PublicKey::from(&secret);
        X25519PublicKeyBytes(public.to_bytes())
    }
}


// -- Property-based tests (proptest) ----------------------------------------
