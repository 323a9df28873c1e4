//! # Participant Identity Material
//!
//! Per-participant long-term and ephemeral key material: a long-term
//! Kyber-512 keypair, a classical X25519 identity keypair, and the
//! precomputed identity commitment published via signalling presence at
//! conference join. Ephemeral one-time X25519 keypairs are minted per
//! pairwise session as it is established, mirroring the olm one-time-key
//! idiom without a persistent prekey pool (out of scope, see §1 Non-goals:
//! no offline messaging).
//!
//! Grounded on the parent crate's `sync::handshake::InitiatorKeyPair`
//! pairing of an X25519 keypair with a Kyber keypair, and on
//! `crypto::kem`/`crypto::ecdh` for the primitives themselves.

use crate::crypto::ecdh::{X25519KeyPair, X25519PublicKeyBytes, X25519SecretKeyBytes, X25519ECDH};
use crate::crypto::hash::HashOutput;
use crate::crypto::kem::{KyberKeyPair, KyberPublicKeyBytes, KyberSecretKeyBytes, KyberKEM};
use crate::crypto::{commit_identity, CryptoError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A freshly minted one-time classical keypair, consumed by the first
/// session it is handed to.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct OneTimeKeyPair {
    #[zeroize(skip)]
    public: X25519PublicKeyBytes,
    secret: X25519SecretKeyBytes,
}

impl OneTimeKeyPair {
    /// Mint a fresh one-time X25519 keypair.
    pub fn generate() -> Self {
        let kp = X25519ECDH::generate_keypair();
        Self {
            public: kp.public,
            secret: kp.secret,
        }
    }

    /// The public half, sent to the peer in `session-init`/`pq-session-init`.
    pub fn public(&self) -> &X25519PublicKeyBytes {
        &self.public
    }

    /// The secret half, consumed when the classical session is established.
    pub fn secret(&self) -> &X25519SecretKeyBytes {
        &self.secret
    }
}

/// Long-term identity material for the local participant.
///
/// Created once at `set_enabled(true)`, destroyed on `on_conference_left`
/// (or a `set_enabled(false)` that tears the group down). Holds both
/// keypairs and the precomputed identity commitment so repeated
/// `commit_identity` calls don't recompute the hash.
pub struct IdentityMaterial {
    participant_id: String,
    kem: KyberKeyPair,
    classical: X25519KeyPair,
    commitment: HashOutput,
}

impl IdentityMaterial {
    /// Generate fresh identity material for `participant_id`.
    pub fn generate(participant_id: impl Into<String>) -> Self {
        let participant_id = participant_id.into();
        let kem = KyberKEM::generate_keypair();
        let classical = X25519ECDH::generate_keypair();
        let commitment = commit_identity(
            &participant_id,
            kem.public.as_bytes(),
            classical.public.as_bytes(),
        );

        Self {
            participant_id,
            kem,
            classical,
            commitment,
        }
    }

    /// This participant's ID.
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// The long-term Kyber-512 public key.
    pub fn kem_public(&self) -> &KyberPublicKeyBytes {
        &self.kem.public
    }

    /// The long-term Kyber-512 secret key.
    pub fn kem_secret(&self) -> &KyberSecretKeyBytes {
        &self.kem.secret
    }

    /// The classical X25519 identity public key.
    pub fn classical_public(&self) -> &X25519PublicKeyBytes {
        &self.classical.public
    }

    /// The classical X25519 identity secret key.
    pub fn classical_secret(&self) -> &X25519SecretKeyBytes {
        &self.classical.secret
    }

    /// The precomputed identity commitment, published via signalling
    /// presence (`e2ee.idKey.commitments`) at conference join.
    pub fn commitment(&self) -> &HashOutput {
        &self.commitment
    }

    /// Base64-encode the Kyber public key for the signalling wire format.
    pub fn kem_public_base64(&self) -> String {
        BASE64.encode(self.kem.public.as_bytes())
    }

    /// Base64-encode the classical identity public key for the signalling
    /// wire format.
    pub fn classical_public_base64(&self) -> String {
        BASE64.encode(self.classical.public.as_bytes())
    }
}

/// Decode a base64 public-key field from a signalling payload.
pub fn decode_base64(value: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(value)
        .map_err(|e| CryptoError::bad_input(format!("invalid base64: {e}")))
}

/// Base64-encode a binary field for a signalling payload.
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
