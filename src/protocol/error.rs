//! Pairwise-protocol error type.

use crate::crypto::CryptoError;
use thiserror::Error;

/// Errors from the pairwise handshake and its `key-info` follow-ups.
///
/// Every variant maps to one of the taxonomy buckets the group key handler
/// dispatches on: malformed wire input, a failed cryptographic check, an
/// out-of-sequence message, a stalled handshake, or a peer that is simply
/// gone. `InternalInvariant` is reserved for states that should be
/// unreachable and indicates a bug rather than a hostile or slow peer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed or unparseable message content.
    #[error("bad input: {0}")]
    BadInput(String),

    /// A cryptographic check failed: commitment mismatch, AEAD
    /// authentication failure, or identity verification failure.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// A message arrived that doesn't belong in the session's current state.
    #[error("protocol sequence violation: expected {expected}, got {actual}")]
    ProtocolSequence {
        /// The message type (or class of message) the state machine expected next.
        expected: &'static str,
        /// The message type actually received.
        actual: String,
    },

    /// The handshake did not reach `done` within the configured timeout.
    #[error("handshake timed out")]
    Timeout,

    /// The peer this session concerns has already left the conference.
    #[error("peer is gone")]
    PeerGone,

    /// An invariant the code assumes was violated; indicates a bug.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Underlying cryptographic primitive failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Signalling payload failed to (de)serialize.
    #[error("signalling payload error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Build a [`ProtocolError::BadInput`] from any displayable message.
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }

    /// Build a [`ProtocolError::AuthFailure`] from any displayable message.
    pub fn auth_failure(msg: impl Into<String>) -> Self {
        Self::AuthFailure(msg.into())
    }

    /// Build a [`ProtocolError::ProtocolSequence`] violation.
    pub fn sequence(expected: &'static str, actual: impl Into<String>) -> Self {
        Self::ProtocolSequence {
            expected,
            actual: actual.into(),
        }
    }

    /// Build a [`ProtocolError::InternalInvariant`] from any displayable message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalInvariant(msg.into())
    }
}

/// Convenience alias used throughout this module.
pub type Result<T> = std::result::Result<T, ProtocolError>;
