//! # Commitment Derivations
//!
//! Hash-based commitments binding a participant to identity keys and media
//! keys so a later reveal can be checked against an earlier promise. Both
//! commitments and [`hash_participant_state`] (used for SAS aggregation) are
//! built on [`crate::crypto::hash::Blake3Hasher`] with a fixed domain-
//! separation prefix, rather than [`crate::crypto::hash::DeriveKey`]'s XOF
//! mode — commitments are fixed-length comparison values, not key material.

use crate::crypto::hash::{hash, Blake3Hasher, HashOutput};

/// Domain-separation prefix for [`commit_identity`].
const IDENTITY_PREFIX: &[u8] = b"confcrypt-core/v1/identity-commitment";

/// Domain-separation prefix for [`commit_media_key`].
const MEDIA_PREFIX: &[u8] = b"confcrypt-core/v1/media-key-commitment";

/// Domain-separation prefix for [`hash_participant_state`].
const PARTICIPANT_STATE_PREFIX: &[u8] = b"confcrypt-core/v1/participant-state";

/// Commit a participant to its long-term identity keys.
///
/// `hash(identity-prefix ‖ id ‖ kem_pub ‖ classical_pub)`, published via the
/// signalling presence channel at conference join and checked by every peer
/// on receipt of `session-init`/`pq-session-init`.
pub fn commit_identity(id: &str, kem_pub: &[u8], classical_pub: &[u8]) -> HashOutput {
    Blake3Hasher::new()
        .update(IDENTITY_PREFIX)
        .update(id.as_bytes())
        .update(kem_pub)
        .update(classical_pub)
        .finalize()
}

/// Commit a participant to a snapshot of its media key.
///
/// `hash(media-prefix ‖ id ‖ olm_share ‖ pq_share ‖ index)`. The initiator
/// carries this through the handshake so the receiver can confirm the media
/// key revealed later matches the promise made up front.
pub fn commit_media_key(id: &str, olm_share: &[u8; 32], pq_share: &[u8; 32], index: u64) -> HashOutput {
    Blake3Hasher::new()
        .update(MEDIA_PREFIX)
        .update(id.as_bytes())
        .update(olm_share)
        .update(pq_share)
        .update(&index.to_be_bytes())
        .finalize()
}

/// Hash a participant's current installed key together with its identity
/// commitment, for SAS aggregation.
///
/// Folding in `identity_commitment` means a MITM that substitutes identity
/// keys (and therefore a different identity commitment) changes the SAS even
/// if it somehow relayed the same media key bytes.
pub fn hash_participant_state(
    id: &str,
    olm_share: &[u8; 32],
    pq_share: &[u8; 32],
    index: u64,
    identity_commitment: &HashOutput,
) -> HashOutput {
    Blake3Hasher::new()
        .update(PARTICIPANT_STATE_PREFIX)
        .update(id.as_bytes())
        .update(olm_share)
        .update(pq_share)
        .update(&index.to_be_bytes())
        .update(identity_commitment.as_bytes())
        .finalize()
}

/// Convenience: BLAKE3 hash of arbitrary bytes, re-exported for callers that
/// only need a plain one-shot hash alongside the commitments above.
pub fn hash_bytes(data: &[u8]) -> HashOutput {
    hash(data)
}
