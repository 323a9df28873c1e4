//! Frame codec error type.

use crate::crypto::CryptoError;
use thiserror::Error;

/// Errors from per-frame encode/decode.
///
/// Every variant here resolves to "drop the frame" at the codec boundary
/// (§4.2/§7): callers convert `Result<Vec<u8>, CodecError>` to
/// `Option<Vec<u8>>` rather than propagating these further.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is shorter than the minimum trailer size (prefix + IV + index byte).
    #[error("frame too short: {len} bytes")]
    FrameTooShort {
        /// The frame's actual length in bytes.
        len: usize,
    },

    /// No media key is installed for this frame's key index.
    #[error("no key installed for index {index}")]
    NoKeyInstalled {
        /// The key index (mod 256) carried in the frame trailer.
        index: u8,
    },

    /// Underlying cryptographic failure (AEAD authentication failure, bad key length, ...).
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
