//! # Group Key Handler
//!
//! The top-level entry point: one [`GroupKeyHandler`] per local participant,
//! orchestrating the pairwise protocol ([`crate::protocol::PairwiseProtocol`])
//! and the frame-context worker ([`worker::FrameContextWorker`]) in response
//! to conference membership events and incoming signalling messages.
//!
//! Grounded on the parent crate's top-level `bridge`/`storage` split between
//! an outward-facing coordinator and a dedicated state owner, generalized
//! here to a protocol coordinator (`PairwiseProtocol`) and a frame-pipeline
//! owner (`FrameContextWorker`) under one roof.

pub mod config;
pub mod error;
pub mod worker;

pub use config::HandlerConfig;
pub use error::{HandlerError, Result};

use crate::crypto::hash::HashOutput;
use crate::identity::IdentityMaterial;
use crate::mediakey::MediaKey;
use crate::protocol::{Envelope, OlmMessage, PairwiseProtocol, ProtocolStatus};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use worker::FrameContextWorker;

/// A short authentication string rendering: seven `(emoji_name, label)` pairs.
pub type Sas = Vec<(&'static str, &'static str)>;

/// One outbound signalling send the handler wants the host to perform.
#[derive(Debug, Clone)]
pub struct OutgoingSignal {
    /// The peer to deliver this envelope to.
    pub peer_id: String,
    /// The envelope to send.
    pub envelope: Envelope,
}

/// Everything a single call into [`GroupKeyHandler`] produced: signalling
/// sends the host must perform, and a SAS if it changed as a result.
#[derive(Debug, Clone, Default)]
pub struct HandlerOutcome {
    /// Envelopes to deliver, in order.
    pub outgoing: Vec<OutgoingSignal>,
    /// `Some` if this call changed the aggregated SAS (§4.4).
    pub sas: Option<Sas>,
}

impl HandlerOutcome {
    fn push(&mut self, peer_id: impl Into<String>, message: OlmMessage) {
        self.outgoing.push(OutgoingSignal {
            peer_id: peer_id.into(),
            envelope: Envelope::new(message),
        });
    }
}

/// Per-participant bookkeeping the handler keeps alongside the pairwise
/// protocol's own session map: the peer's published identity commitment
/// (required to validate `session-init`/`pq-session-init`) and the index of
/// the media key last installed for it in the frame pipeline (used to drop
/// stale `key-info`, §5 ordering guarantee).
#[derive(Default)]
struct PeerRecord {
    identity_commitment: Option<HashOutput>,
    last_installed_index: Option<u64>,
}

/// One local participant's E2EE coordinator: identity lifecycle, the
/// pairwise handshake with every peer, the frame pipeline's installed keys,
/// and the SAS derived from all of it.
///
/// `set_enabled`/`on_participant_joined`/`on_participant_left`/
/// `on_conference_left`/`on_signalling_message` are the five operations a
/// host conference implementation drives this with (§4.4).
pub struct GroupKeyHandler {
    local_id: String,
    enabled: bool,
    next_index: u64,
    protocol: Option<PairwiseProtocol>,
    frames: FrameContextWorker,
    peers: BTreeMap<String, PeerRecord>,
    handshake_timeout: Duration,
}

impl GroupKeyHandler {
    /// Create a disabled handler for `local_id` with `config`'s tunables.
    pub fn new(local_id: impl Into<String>, config: HandlerConfig) -> Self {
        Self {
            local_id: local_id.into(),
            enabled: false,
            next_index: 0,
            protocol: None,
            frames: FrameContextWorker::new(config.sas_bit_length()),
            peers: BTreeMap::new(),
            handshake_timeout: config.handshake_timeout(),
        }
    }

    /// Whether the handler is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The local identity commitment to publish via presence, if enabled.
    pub fn identity_commitment(&self) -> Option<&HashOutput> {
        self.protocol.as_ref().map(|p| p.identity().commitment())
    }

    /// The media key currently installed in the local frame context, if any.
    pub fn local_key(&self) -> Option<&MediaKey> {
        self.frames.installed_key(&self.local_id)
    }

    /// The current SAS computed from every installed frame context, fresh
    /// on every call regardless of whether it has changed since the last
    /// [`HandlerOutcome::sas`] emission. Used to compare SAS across
    /// participants at a quiescent point (§8 invariant 1).
    pub fn current_sas(&self) -> Sas {
        self.frames.current_sas()
    }

    /// Record (or update) a peer's published identity commitment, learned
    /// from signalling presence at join. Required before `session-init`/
    /// `pq-session-init` from that peer can be validated.
    pub fn set_peer_identity_commitment(&mut self, peer_id: &str, commitment: HashOutput) {
        self.peers.entry(peer_id.to_string()).or_default().identity_commitment = Some(commitment);
    }

    /// Enable or disable the handler (idempotent). See module docs for the
    /// enable/disable sequence; each toggle cycle advances the local media
    /// key's index.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<HandlerOutcome> {
        if enabled == self.enabled {
            return Ok(HandlerOutcome::default());
        }
        if enabled {
            self.enable()
        } else {
            self.disable();
            Ok(HandlerOutcome::default())
        }
    }

    fn enable(&mut self) -> Result<HandlerOutcome> {
        if self.protocol.is_none() {
            self.protocol = Some(PairwiseProtocol::new(IdentityMaterial::generate(self.local_id.clone())));
        }
        let identity_commitment = self.protocol.as_ref().unwrap().identity().commitment().clone();

        let key = MediaKey::generate(&self.local_id, self.next_index);
        self.next_index += 1;
        self.frames.set_key(&self.local_id, key.clone(), identity_commitment)?;
        self.enabled = true;

        let mut outcome = HandlerOutcome::default();
        let protocol = self.protocol.as_mut().expect("protocol initialised above");
        let smaller_peers: Vec<String> = self
            .peers
            .keys()
            .filter(|peer_id| self.local_id.as_str() > peer_id.as_str())
            .cloned()
            .collect();
        for peer_id in smaller_peers {
            if let Some(message) = protocol.start_session(&peer_id, &key)? {
                outcome.push(peer_id, message);
            }
        }

        outcome.sas = self.frames.recompute_sas();
        Ok(outcome)
    }

    fn disable(&mut self) {
        self.protocol = None;
        self.frames.cleanup_all();
        self.enabled = false;
    }

    /// A new participant has joined the conference. No-op unless the
    /// handler is enabled. Ratchets the local key and, for every peer whose
    /// session has already completed (or is one message short of it),
    /// ratchets that peer's installed frame context too — both sides
    /// advance deterministically, with nothing exchanged over the wire
    /// (§4.4).
    pub fn on_participant_joined(&mut self, peer_id: &str) -> Result<HandlerOutcome> {
        self.peers.entry(peer_id.to_string()).or_default();

        let mut outcome = HandlerOutcome::default();
        if !self.enabled {
            return Ok(outcome);
        }

        self.frames.ratchet(&self.local_id)?;

        if let Some(protocol) = self.protocol.as_ref() {
            let converged_peers: Vec<String> = self
                .peers
                .keys()
                .filter(|pid| {
                    protocol
                        .session(pid)
                        .map(|session| matches!(session.status(), ProtocolStatus::Done | ProtocolStatus::WaitingDone))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            for pid in converged_peers {
                self.frames.ratchet(&pid)?;
            }
        }

        outcome.sas = self.frames.recompute_sas();
        Ok(outcome)
    }

    /// A participant has left the conference. Terminates its pairwise
    /// session, drops its frame context, and (if enabled) rotates the local
    /// key to a fresh, independent generation and pushes `key-info` to every
    /// peer whose session is still `done`.
    pub fn on_participant_left(&mut self, peer_id: &str) -> Result<HandlerOutcome> {
        self.peers.remove(peer_id);
        self.frames.cleanup(peer_id);
        if let Some(protocol) = self.protocol.as_mut() {
            protocol.remove_session(peer_id);
        }

        let mut outcome = HandlerOutcome::default();
        if !self.enabled {
            return Ok(outcome);
        }

        let rotated = match self.frames.installed_key(&self.local_id) {
            Some(key) => key.rotate(),
            None => {
                let key = MediaKey::generate(&self.local_id, self.next_index);
                self.next_index += 1;
                key
            }
        };
        let identity_commitment = self
            .protocol
            .as_ref()
            .map(|p| p.identity().commitment().clone())
            .unwrap_or_else(|| HashOutput::from_bytes([0u8; 32]));
        self.frames.set_key(&self.local_id, rotated.clone(), identity_commitment)?;

        if let Some(protocol) = self.protocol.as_ref() {
            for (remaining_peer, message) in protocol.build_key_info_for_all(&rotated) {
                outcome.push(remaining_peer, message);
            }
        }

        outcome.sas = self.frames.recompute_sas();
        Ok(outcome)
    }

    /// The local participant has left the conference: every session is
    /// terminated, identity material is dropped, and every frame context is
    /// cleared.
    pub fn on_conference_left(&mut self) {
        self.protocol = None;
        self.frames.cleanup_all();
        self.peers.clear();
        self.enabled = false;
    }

    /// Terminate any pairwise session that has been pending longer than the
    /// configured handshake timeout, returning the affected peer IDs. The
    /// host is expected to call this periodically; there is no background
    /// timer driving it (§5 cancellation semantics).
    pub fn check_timeouts(&mut self, now: Instant) -> Vec<String> {
        match self.protocol.as_mut() {
            Some(protocol) => protocol.check_timeouts(now, self.handshake_timeout),
            None => Vec::new(),
        }
    }

    /// Route an incoming signalling envelope from `peer_id` through the
    /// pairwise protocol, installing any media key it reveals into the
    /// frame pipeline and recomputing the SAS if it changed.
    ///
    /// Any protocol-level failure is converted to an outbound `error`
    /// message addressed to `peer_id` rather than propagated, per the
    /// receive-path error policy (§7); only a malformed envelope itself (one
    /// that cannot even be dispatched) is returned as an error here.
    pub fn on_signalling_message(&mut self, peer_id: &str, envelope: Envelope) -> Result<HandlerOutcome> {
        let mut outcome = HandlerOutcome::default();
        if !self.enabled {
            return Ok(outcome);
        }

        let identity_commitment = self
            .peers
            .get(peer_id)
            .and_then(|record| record.identity_commitment.clone())
            .unwrap_or_else(|| HashOutput::from_bytes([0u8; 32]));
        let last_installed_index = self.peers.get(peer_id).and_then(|record| record.last_installed_index).unwrap_or(0);

        let Some(local_key) = self.frames.installed_key(&self.local_id).cloned() else {
            return Ok(outcome);
        };
        let Some(protocol) = self.protocol.as_mut() else {
            return Ok(outcome);
        };

        let result = protocol.handle_message(peer_id, &local_key, &identity_commitment, last_installed_index, envelope.olm);

        match result {
            Ok(step) => {
                for message in step.outbound {
                    outcome.push(peer_id, message);
                }
                if let Some(revealed) = step.revealed_key {
                    self.peers.entry(peer_id.to_string()).or_default().last_installed_index = Some(revealed.index());
                    self.frames.set_key(peer_id, revealed, identity_commitment)?;
                }
            }
            Err(crate::protocol::ProtocolError::Crypto(_)) | Err(crate::protocol::ProtocolError::ProtocolSequence { .. }) => {
                outcome.push(
                    peer_id,
                    OlmMessage::Error(crate::protocol::messages::ErrorPayload {
                        error: "pairwise handshake failed".to_string(),
                    }),
                );
            }
            Err(other) => return Err(other.into()),
        }

        outcome.sas = self.frames.recompute_sas();
        Ok(outcome)
    }
}
