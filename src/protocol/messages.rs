//! # Wire Messages
//!
//! The seven tagged pairwise-protocol messages and the envelope that wraps
//! them for the signalling transport. All byte fields are base64 except
//! identity/media-key commitments, which travel as hex strings (matching
//! [`crate::crypto::hash::HashOutput`]'s `Display` impl).
//!
//! Grounded on the parent crate's `sync::codec::PayloadType`/`MessageCodec`
//! tagged-message shape, generalized from a single binary payload type to
//! `serde_json`'s adjacently-tagged enum representation.

use serde::{Deserialize, Serialize};

/// `session-init.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInitPayload {
    /// Base64 one-time classical public key minted for this session.
    #[serde(rename = "otKey")]
    pub ot_key: String,
    /// Base64 long-term classical identity public key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Base64 long-term Kyber-512 identity public key.
    #[serde(rename = "publicKyberKey")]
    pub public_kyber_key: String,
    /// Hex commitment to the sender's current media key.
    pub commitment: String,
}

/// `pq-session-init.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PqSessionInitPayload {
    /// Base64 Kyber ciphertext encapsulated to the peer's identity KEM key.
    #[serde(rename = "encapsKyber")]
    pub encaps_kyber: String,
    /// Base64 long-term classical identity public key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Base64 long-term Kyber-512 identity public key.
    #[serde(rename = "publicKyberKey")]
    pub public_kyber_key: String,
    /// Base64 classical-session-encrypted media-key commitment.
    pub ciphertext: String,
}

/// `pq-session-ack.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PqSessionAckPayload {
    /// Base64 Kyber ciphertext encapsulated to the peer's identity KEM key.
    #[serde(rename = "encapsKyber")]
    pub encaps_kyber: String,
    /// Base64 classical-session-encrypted media key.
    pub ciphertext: String,
    /// Base64 PQ-AEAD-encrypted media key.
    #[serde(rename = "pqCiphertext")]
    pub pq_ciphertext: String,
}

/// `session-ack.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAckPayload {
    /// Base64 classical-session-encrypted media key.
    pub ciphertext: String,
    /// Base64 PQ-AEAD-encrypted media key.
    #[serde(rename = "pqCiphertext")]
    pub pq_ciphertext: String,
}

/// `session-done.data` (always empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDonePayload {}

/// `key-info.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfoPayload {
    /// Base64 classical-session-encrypted media key.
    pub ciphertext: String,
    /// Base64 PQ-AEAD-encrypted media key.
    #[serde(rename = "pqCiphertext")]
    pub pq_ciphertext: String,
}

/// `error.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable failure description; never includes secret material.
    pub error: String,
}

/// One of the seven tagged pairwise-protocol messages.
///
/// Serializes to `{"type": "<message-type-string>", "data": {...}}`, the
/// shape carried under the signalling envelope's `olm` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum OlmMessage {
    /// First message, sent by the larger-ID peer.
    SessionInit(SessionInitPayload),
    /// Reply to `session-init`, sent by the smaller-ID peer.
    PqSessionInit(PqSessionInitPayload),
    /// Reply to `pq-session-init`, sent by the larger-ID peer.
    PqSessionAck(PqSessionAckPayload),
    /// Reply to `pq-session-ack`, sent by the smaller-ID peer.
    SessionAck(SessionAckPayload),
    /// Final handshake acknowledgement, sent by the larger-ID peer.
    SessionDone(SessionDonePayload),
    /// Out-of-band media key push, sent by either side after `done`.
    KeyInfo(KeyInfoPayload),
    /// Protocol-level failure report.
    Error(ErrorPayload),
}

impl OlmMessage {
    /// The wire message-type string (`"session-init"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            OlmMessage::SessionInit(_) => "session-init",
            OlmMessage::PqSessionInit(_) => "pq-session-init",
            OlmMessage::PqSessionAck(_) => "pq-session-ack",
            OlmMessage::SessionAck(_) => "session-ack",
            OlmMessage::SessionDone(_) => "session-done",
            OlmMessage::KeyInfo(_) => "key-info",
            OlmMessage::Error(_) => "error",
        }
    }
}

/// The signalling envelope carrying a single [`OlmMessage`].
///
/// `e2ee_olm` is the transport marker distinguishing this payload from
/// ordinary signalling chatter; its value is always `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Transport marker: always `true`.
    #[serde(rename = "e2ee.olm")]
    pub e2ee_olm: bool,
    /// The wrapped protocol message.
    pub olm: OlmMessage,
}

impl Envelope {
    /// Wrap `message` in a new envelope.
    pub fn new(message: OlmMessage) -> Self {
        Self {
            e2ee_olm: true,
            olm: message,
        }
    }
}
