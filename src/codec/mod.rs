//! # Frame Codec
//!
//! Per-frame AEAD transform attached to the media pipeline. Frames carry a
//! 1-byte unencrypted prefix (the codec's own payload descriptor/TOC byte),
//! an AES-256-GCM ciphertext with its 16-byte tag, a 12-byte IV, and a
//! trailing key-index byte:
//!
//! ```text
//! [ 1B prefix ][ ciphertext + 16B tag ][ 12B IV ][ 1B key-index ]
//! ```
//!
//! The prefix is copied unchanged and doubles as the AEAD additional
//! authenticated data. [`FrameContext`] holds exactly one installed key —
//! there is no keyring — so the trailing index byte lets [`FrameContext::decode`]
//! *detect* a stale/future key rather than select among several.
//!
//! Grounded on the parent crate's `sync::codec::MessageCodec` framing
//! conventions and `crypto::aead::AeadCipher` for the cipher itself.

pub mod error;

pub use error::CodecError;

use crate::crypto::aead::{AeadCipher, AeadIv, NONCE_SIZE, TAG_SIZE};
use crate::crypto::hash::HashOutput;
use crate::crypto::{commit_media_key, HkdfSha256};
use crate::mediakey::MediaKey;
use rand::RngCore;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Minimum frame length: 1-byte prefix + 16-byte tag (zero-length plaintext) + 12-byte IV + 1-byte index.
const MIN_FRAME_LEN: usize = 1 + TAG_SIZE + NONCE_SIZE + 1;

/// The per-participant encode/decode context held by the media-pipeline worker.
///
/// Holds the currently installed [`MediaKey`], its derived AEAD cipher, and
/// the key's commitment hash (the "hash of the current key" used when
/// composing SAS material). There is one `FrameContext` per participant,
/// including the local one; it is replaced wholesale on `setKey`/`ratchetKeys`
/// and torn down on peer-leave or disable.
pub struct FrameContext {
    key: MediaKey,
    cipher: AeadCipher,
    commitment: HashOutput,
    already_logged: AtomicBool,
}

impl FrameContext {
    /// Install `key`, deriving its AEAD cipher and commitment hash.
    pub fn new(key: MediaKey) -> crate::crypto::Result<Self> {
        let aead_key_bytes = HkdfSha256::derive_aead_key(key.olm_share(), key.pq_share())?;
        let aead_key = crate::crypto::aead::AeadKey::from_bytes(&aead_key_bytes)?;
        let commitment = commit_media_key(key.user_id(), key.olm_share(), key.pq_share(), key.index());
        Ok(Self {
            key,
            cipher: AeadCipher::new(&aead_key),
            commitment,
            already_logged: AtomicBool::new(false),
        })
    }

    /// Replace the installed key (`setKey`/`ratchetKeys`/`rotate`).
    pub fn install(&mut self, key: MediaKey) -> crate::crypto::Result<()> {
        *self = Self::new(key)?;
        Ok(())
    }

    /// The currently installed media key.
    pub fn key(&self) -> &MediaKey {
        &self.key
    }

    /// The commitment hash of the currently installed key, used for SAS aggregation.
    pub fn commitment(&self) -> &HashOutput {
        &self.commitment
    }

    fn warn_once(&self, message: &str) {
        if self
            .already_logged
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            warn!(user_id = %self.key.user_id(), message, "dropping frame");
        }
    }

    /// Encrypt `frame` under the installed key.
    ///
    /// Returns `None` (drop the frame) on any crypto failure; the failure is
    /// logged at most once per session. `frame` must be at least 1 byte
    /// (the unencrypted prefix); shorter frames are also dropped.
    pub fn encode(&self, frame: &[u8]) -> Option<Vec<u8>> {
        self.try_encode(frame)
            .map_err(|e| self.warn_once(&e.to_string()))
            .ok()
    }

    /// Decrypt `frame` under the installed key, checking its trailing key
    /// index matches the installed key's `index mod 256`.
    ///
    /// Returns `None` (drop the frame) if the frame is too short, the key
    /// index doesn't match, or AEAD authentication fails.
    pub fn decode(&self, frame: &[u8]) -> Option<Vec<u8>> {
        self.try_decode(frame)
            .map_err(|e| self.warn_once(&e.to_string()))
            .ok()
    }

    /// Fallible encode, kept distinct from the public `Option`-returning
    /// [`Self::encode`] so the precise failure reason (§7 taxonomy) is
    /// available to log before it is collapsed to a drop at the boundary.
    fn try_encode(&self, frame: &[u8]) -> Result<Vec<u8>, CodecError> {
        if frame.is_empty() {
            return Err(CodecError::FrameTooShort { len: 0 });
        }
        let prefix = &frame[0..1];
        let payload = &frame[1..];

        let mut iv_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut iv_bytes);
        let iv = AeadIv::from_bytes(&iv_bytes)?;
        let ciphertext = self.cipher.encrypt(&iv, payload, prefix)?;

        let mut out = Vec::with_capacity(1 + ciphertext.len() + NONCE_SIZE + 1);
        out.extend_from_slice(prefix);
        out.extend_from_slice(&ciphertext);
        out.extend_from_slice(&iv_bytes);
        out.push((self.key.index() % 256) as u8);
        Ok(out)
    }

    /// Fallible decode; see [`Self::try_encode`] for why this is separate
    /// from the public [`Self::decode`].
    fn try_decode(&self, frame: &[u8]) -> Result<Vec<u8>, CodecError> {
        if frame.len() < MIN_FRAME_LEN {
            return Err(CodecError::FrameTooShort { len: frame.len() });
        }

        let trailer_index = frame[frame.len() - 1];
        let expected_index = (self.key.index() % 256) as u8;
        if trailer_index != expected_index {
            return Err(CodecError::NoKeyInstalled { index: trailer_index });
        }

        let prefix = &frame[0..1];
        let iv_start = frame.len() - 1 - NONCE_SIZE;
        let iv_bytes = &frame[iv_start..frame.len() - 1];
        let ciphertext = &frame[1..iv_start];

        let iv = AeadIv::from_bytes(iv_bytes)?;
        let plaintext = self.cipher.decrypt(&iv, ciphertext, prefix)?;

        let mut out = Vec::with_capacity(1 + plaintext.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(&plaintext);
        Ok(out)
    }
}
