//! # Media Key
//!
//! The per-participant secret from which per-frame AEAD keys are derived:
//! two independent 32-byte shares (`olm_share`, `pq_share`) plus a strictly
//! increasing `index`. Fresh generation draws both shares from the system
//! CSPRNG; [`MediaKey::ratchet`] deterministically advances both shares
//! (used on participant-join, for lightweight forward secrecy); fresh
//! re-generation ("rotate") is used on participant-leave to exclude the
//! departed peer.
//!
//! Grounded on `crypto::kdf::HkdfSha256::ratchet_share` for the ratchet
//! derivation and the crate-wide zeroize-on-drop newtype pattern used for all
//! secret data: media keys are ephemeral and never persisted, unlike the
//! long-lived epoch keys other key-hierarchy designs in this space manage.

use crate::crypto::error::Result;
use crate::crypto::kdf::HkdfSha256;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The per-participant media key: two 32-byte shares plus a monotonic index.
///
/// `index` strictly increases over the lifetime of a participant's
/// membership (ratchet and rotate both advance it); the frame trailer
/// carries `index mod 256` (see `crate::codec`).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MediaKey {
    #[zeroize(skip)]
    user_id: String,
    olm_share: [u8; 32],
    pq_share: [u8; 32],
    index: u64,
}

impl MediaKey {
    /// Generate a fresh media key at `index` with independent uniform
    /// random shares. Used both for initial distribution (index 0) and for
    /// "rotate" on participant-leave (fresh index, caller picks the next
    /// value).
    pub fn generate(user_id: impl Into<String>, index: u64) -> Self {
        let mut rng = rand::thread_rng();
        let mut olm_share = [0u8; 32];
        let mut pq_share = [0u8; 32];
        rng.fill_bytes(&mut olm_share);
        rng.fill_bytes(&mut pq_share);

        Self {
            user_id: user_id.into(),
            olm_share,
            pq_share,
            index,
        }
    }

    /// Reconstruct a media key from its raw shares (used when installing a
    /// key revealed by a peer through the pairwise protocol).
    pub fn from_shares(user_id: impl Into<String>, olm_share: [u8; 32], pq_share: [u8; 32], index: u64) -> Self {
        Self {
            user_id: user_id.into(),
            olm_share,
            pq_share,
            index,
        }
    }

    /// Deterministically advance both shares via `HKDF::ratchet_share`,
    /// incrementing `index` by one. Used on participant-join: both sides of
    /// an existing pairwise session independently ratchet and never
    /// exchange the new key (§4.4).
    pub fn ratchet(&self) -> Result<Self> {
        let olm_share = HkdfSha256::ratchet_share(&self.olm_share)?;
        let pq_share = HkdfSha256::ratchet_share(&self.pq_share)?;
        Ok(Self {
            user_id: self.user_id.clone(),
            olm_share,
            pq_share,
            index: self.index + 1,
        })
    }

    /// Fresh random regeneration ("rotate"), used on participant-leave to
    /// exclude the departed peer. `index` is always strictly greater than
    /// the prior value.
    pub fn rotate(&self) -> Self {
        Self::generate(self.user_id.clone(), self.index + 1)
    }

    /// The owning participant's ID.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The classical ("olm") share.
    pub fn olm_share(&self) -> &[u8; 32] {
        &self.olm_share
    }

    /// The post-quantum share.
    pub fn pq_share(&self) -> &[u8; 32] {
        &self.pq_share
    }

    /// The monotonically increasing index.
    pub fn index(&self) -> u64 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_starts_at_given_index() {
        let key = MediaKey::generate("03", 0);
        assert_eq!(key.index(), 0);
    }

    #[test]
    fn test_generate_shares_are_nonzero_and_distinct() {
        let key = MediaKey::generate("03", 0);
        assert_ne!(key.olm_share(), &[0u8; 32]);
        assert_ne!(key.pq_share(), &[0u8; 32]);
        assert_ne!(key.olm_share(), key.pq_share());
    }

    #[test]
    fn test_two_generated_keys_differ() {
        let a = MediaKey::generate("03", 0);
        let b = MediaKey::generate("03", 0);
        assert_ne!(a.olm_share(), b.olm_share());
        assert_ne!(a.pq_share(), b.pq_share());
    }

    #[test]
    fn test_ratchet_increments_index() {
        let key = MediaKey::generate("03", 0);
        let ratcheted = key.ratchet().unwrap();
        assert_eq!(ratcheted.index(), 1);
    }

    #[test]
    fn test_ratchet_is_deterministic() {
        let key = MediaKey::generate("03", 0);
        let a = key.ratchet().unwrap();
        let b = key.ratchet().unwrap();
        assert_eq!(a.olm_share(), b.olm_share());
        assert_eq!(a.pq_share(), b.pq_share());
    }

    #[test]
    fn test_ratchet_changes_shares() {
        let key = MediaKey::generate("03", 0);
        let ratcheted = key.ratchet().unwrap();
        assert_ne!(key.olm_share(), ratcheted.olm_share());
        assert_ne!(key.pq_share(), ratcheted.pq_share());
    }

    #[test]
    fn test_rotate_increments_index_and_changes_shares() {
        let key = MediaKey::generate("03", 5);
        let rotated = key.rotate();
        assert_eq!(rotated.index(), 6);
        assert_ne!(key.olm_share(), rotated.olm_share());
        assert_ne!(key.pq_share(), rotated.pq_share());
    }

    #[test]
    fn test_rotate_preserves_user_id() {
        let key = MediaKey::generate("peer-01", 0);
        let rotated = key.rotate();
        assert_eq!(rotated.user_id(), "peer-01");
    }

    #[test]
    fn test_from_shares_roundtrip() {
        let olm = [0x11u8; 32];
        let pq = [0x22u8; 32];
        let key = MediaKey::from_shares("01", olm, pq, 4);
        assert_eq!(key.olm_share(), &olm);
        assert_eq!(key.pq_share(), &pq);
        assert_eq!(key.index(), 4);
    }

    #[test]
    fn test_index_never_decreases_across_ratchet_chain() {
        let mut key = MediaKey::generate("03", 0);
        let mut last_index = key.index();
        for _ in 0..10 {
            key = key.ratchet().unwrap();
            assert!(key.index() > last_index);
            last_index = key.index();
        }
    }
}
