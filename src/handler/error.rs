//! Group key handler error type.

use crate::codec::CodecError;
use crate::crypto::CryptoError;
use crate::protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by [`super::GroupKeyHandler`]'s public operations.
///
/// The handler itself never propagates these to the conference host beyond
/// logging and, where the failure concerns a specific peer, sending that
/// peer an `error` message (§7) — `on_signalling_message` is the only
/// operation that returns one of these to its caller, for the case where the
/// envelope itself failed to parse before a peer could be identified.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The pairwise handshake or a `key-info` follow-up failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The frame codec rejected a key installation.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A cryptographic primitive failed outside the pairwise protocol
    /// (e.g. ratcheting the local media key).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The signalling envelope itself could not be parsed.
    #[error("malformed signalling envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    /// An operation was requested that requires `set_enabled(true)` first.
    #[error("group key handler is not enabled")]
    NotEnabled,

    /// An operation named a peer the handler has no record of.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),
}

/// Convenience alias used throughout this module.
pub type Result<T> = std::result::Result<T, HandlerError>;
