//! # Pairwise Protocol
//!
//! The hybrid classical/post-quantum pairwise handshake that establishes,
//! for every ordered pair of participants in a conference, a secure channel
//! used to exchange the local media key (and its later ratchets/rotations)
//! out of band from the media path itself.
//!
//! ## Modules
//!
//! - `error` — [`ProtocolError`], this module's error taxonomy.
//! - `messages` — the seven wire message types and the signalling envelope.
//! - `session` — [`SessionData`], the per-peer state machine and its
//!   cryptographic operations.
//!
//! [`PairwiseProtocol`] is the entry point: one instance per local
//! participant, holding that participant's [`IdentityMaterial`] and one
//! [`SessionData`] per peer it has ever interacted with in the conference's
//! lifetime.
//!
//! Grounded on the parent crate's `sync::handshake::HybridHandshake`
//! initiator/responder dispatch shape, generalized from a point-to-point
//! device pairing to an N-party mesh of independent pairwise sessions.

pub mod error;
pub mod messages;
pub mod session;

pub use error::{ProtocolError, Result};
pub use messages::{Envelope, OlmMessage};
pub use session::{ProtocolStatus, Role, SessionData};

use crate::identity::IdentityMaterial;
use crate::mediakey::MediaKey;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The result of feeding one incoming message through [`PairwiseProtocol::handle_message`].
#[derive(Debug, Default)]
pub struct ProtocolOutcome {
    /// Messages to send back to the peer, in order.
    pub outbound: Vec<OlmMessage>,
    /// A peer media key revealed and verified during this step, if any.
    pub revealed_key: Option<MediaKey>,
    /// `true` if this step moved the session into `done` for the first time.
    pub became_done: bool,
}

/// One local participant's view of the pairwise protocol: its own identity
/// material plus one session per peer.
pub struct PairwiseProtocol {
    identity: IdentityMaterial,
    sessions: HashMap<String, SessionData>,
}

impl PairwiseProtocol {
    /// Create a dispatcher for `identity`. No sessions exist yet.
    pub fn new(identity: IdentityMaterial) -> Self {
        Self {
            identity,
            sessions: HashMap::new(),
        }
    }

    /// The local participant's identity material.
    pub fn identity(&self) -> &IdentityMaterial {
        &self.identity
    }

    /// The session with `peer_id`, if one has been created.
    pub fn session(&self, peer_id: &str) -> Option<&SessionData> {
        self.sessions.get(peer_id)
    }

    /// Borrow or create the session for `peer_id`, without borrowing
    /// `self.identity` — callers that also need identity material borrow it
    /// separately so the two borrows stay disjoint.
    fn get_or_insert_session<'a>(
        sessions: &'a mut HashMap<String, SessionData>,
        local_id: &str,
        peer_id: &str,
    ) -> &'a mut SessionData {
        sessions
            .entry(peer_id.to_string())
            .or_insert_with(|| SessionData::new(local_id, peer_id))
    }

    /// Tear down the session with `peer_id` (peer-leave or conference-leave).
    pub fn remove_session(&mut self, peer_id: &str) {
        self.sessions.remove(peer_id);
    }

    /// Initiator-only: begin a handshake with `peer_id`, carrying `local_key`
    /// as the media key this session promises to reveal.
    ///
    /// No-op (returns `Ok(None)`) if the local participant is the Responder
    /// for this pair, or if a session already exists and has left
    /// `ready-to-start`.
    pub fn start_session(&mut self, peer_id: &str, local_key: &MediaKey) -> Result<Option<OlmMessage>> {
        let local_id = self.identity.participant_id().to_string();
        let session = Self::get_or_insert_session(&mut self.sessions, &local_id, peer_id);
        if session.role() != Role::Initiator {
            return Ok(None);
        }
        if session.status() != ProtocolStatus::ReadyToStart {
            return Ok(None);
        }
        let message = session.start(&self.identity, local_key)?;
        Ok(Some(message))
    }

    /// Feed an incoming message from `peer_id` through its session,
    /// returning outbound replies and any media key revealed as a result.
    ///
    /// `peer_identity_commitment` is the commitment published by `peer_id`
    /// via signalling presence, required to validate `session-init` and
    /// `pq-session-init` (the two messages that first carry identity keys).
    /// `last_installed_index` is the index of the media key currently
    /// installed for `peer_id` in the frame pipeline, used to drop stale
    /// `key-info` pushes.
    pub fn handle_message(
        &mut self,
        peer_id: &str,
        local_key: &MediaKey,
        peer_identity_commitment: &crate::crypto::hash::HashOutput,
        last_installed_index: u64,
        message: OlmMessage,
    ) -> Result<ProtocolOutcome> {
        let local_id = self.identity.participant_id().to_string();
        let identity = &self.identity;
        let session = Self::get_or_insert_session(&mut self.sessions, &local_id, peer_id);

        match (&message, session.status(), session.role()) {
            (OlmMessage::SessionInit(payload), ProtocolStatus::ReadyToStart, Role::Responder) => {
                let reply = session.handle_session_init(identity, local_key, payload, peer_identity_commitment)?;
                Ok(ProtocolOutcome {
                    outbound: vec![reply],
                    ..Default::default()
                })
            }
            (OlmMessage::PqSessionInit(payload), ProtocolStatus::WaitingPqSessionInit, Role::Initiator) => {
                let reply = session.handle_pq_session_init(identity, local_key, payload, peer_identity_commitment)?;
                Ok(ProtocolOutcome {
                    outbound: vec![reply],
                    ..Default::default()
                })
            }
            (OlmMessage::PqSessionAck(payload), ProtocolStatus::WaitingPqSessionAck, Role::Responder) => {
                let (reply, revealed) = session.handle_pq_session_ack(identity, local_key, payload)?;
                Ok(ProtocolOutcome {
                    outbound: vec![reply],
                    revealed_key: Some(revealed),
                    became_done: false,
                })
            }
            (OlmMessage::SessionAck(payload), ProtocolStatus::WaitingSessionAck, Role::Initiator) => {
                let (outbound, revealed) = session.handle_session_ack(local_key, payload)?;
                Ok(ProtocolOutcome {
                    outbound,
                    revealed_key: Some(revealed),
                    became_done: true,
                })
            }
            (OlmMessage::SessionDone(_), ProtocolStatus::WaitingDone, Role::Responder) => {
                let reconciled = session.handle_session_done(local_key)?;
                Ok(ProtocolOutcome {
                    outbound: reconciled.into_iter().collect(),
                    became_done: true,
                    ..Default::default()
                })
            }
            (OlmMessage::KeyInfo(payload), status, _) if status.accepts_key_info() => {
                let revealed = session.handle_key_info(payload, last_installed_index)?;
                Ok(ProtocolOutcome {
                    revealed_key: revealed,
                    ..Default::default()
                })
            }
            (OlmMessage::Error(payload), _, _) => {
                // A single peer-reported error is surfaced to the owner (logged) but
                // does not tear down the session; the handshake may still recover
                // via a later, well-formed message.
                warn!(peer_id, error = %payload.error, "peer reported protocol error");
                Ok(ProtocolOutcome::default())
            }
            // Duplicate pre-key payloads are ignored (§4.3), not fatal: the
            // signalling channel is at-least-once, so a retransmitted
            // session-init/pq-session-init that arrives after the session
            // has already moved past it is a no-op rather than an error.
            (OlmMessage::SessionInit(_), ProtocolStatus::WaitingPqSessionAck | ProtocolStatus::WaitingSessionAck | ProtocolStatus::Done, Role::Responder) => {
                debug!(peer_id, "ignoring duplicate session-init");
                Ok(ProtocolOutcome::default())
            }
            (OlmMessage::PqSessionInit(_), ProtocolStatus::WaitingSessionAck | ProtocolStatus::WaitingDone | ProtocolStatus::Done, Role::Initiator) => {
                debug!(peer_id, "ignoring duplicate pq-session-init");
                Ok(ProtocolOutcome::default())
            }
            (other, status, _) => {
                // §7 ProtocolSequence: "do *not* auto-transition" — the session
                // status is left untouched. Only an AuthFailure (handled inside
                // the per-message handlers above) may terminate a session.
                debug!(peer_id, status = ?status, message_type = other.type_name(), "out-of-sequence message");
                Err(ProtocolError::sequence("a message valid for the current state", other.type_name()))
            }
        }
    }

    /// Terminate every session that has been pending (short of `done`) for
    /// at least `timeout` as of `now`, returning the peer IDs affected.
    ///
    /// There is no background timer in this crate's synchronous model; the
    /// host is expected to call this periodically (§5 cancellation
    /// semantics), the same way it drives `on_participant_joined`/
    /// `on_signalling_message`.
    pub fn check_timeouts(&mut self, now: std::time::Instant, timeout: std::time::Duration) -> Vec<String> {
        let mut expired = Vec::new();
        for (peer_id, session) in self.sessions.iter_mut() {
            if session.is_timed_out(now, timeout) {
                session.terminate();
                expired.push(peer_id.clone());
            }
        }
        expired
    }

    /// Build a `key-info` push for every `done` session, used to propagate a
    /// join-ratcheted or leave-rotated local key to already-established peers.
    pub fn build_key_info_for_all(&self, local_key: &MediaKey) -> Vec<(String, OlmMessage)> {
        self.sessions
            .iter()
            .filter(|(_, session)| session.status() == ProtocolStatus::Done)
            .filter_map(|(peer_id, session)| {
                session
                    .build_key_info(local_key)
                    .ok()
                    .map(|message| (peer_id.clone(), message))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::commit_identity;

    fn participant(id: &str) -> (IdentityMaterial, MediaKey) {
        (IdentityMaterial::generate(id), MediaKey::generate(id, 0))
    }

    #[test]
    fn test_full_handshake_converges_and_reveals_keys() {
        let (identity_a, key_a) = participant("02"); // Responder (smaller id)
        let (identity_b, key_b) = participant("03"); // Initiator (larger id)

        let commitment_a = commit_identity("02", identity_a.kem_public().as_bytes(), identity_a.classical_public().as_bytes());
        let commitment_b = commit_identity("03", identity_b.kem_public().as_bytes(), identity_b.classical_public().as_bytes());

        let mut proto_a = PairwiseProtocol::new(identity_a);
        let mut proto_b = PairwiseProtocol::new(identity_b);

        // B is Initiator: starts the handshake.
        let session_init = proto_b.start_session("02", &key_b).unwrap().unwrap();

        // A (Responder) handles session-init, replies with pq-session-init.
        let pq_session_init = match session_init {
            OlmMessage::SessionInit(ref payload) => proto_a
                .handle_message("03", &key_a, &commitment_b, 0, OlmMessage::SessionInit(payload.clone()))
                .unwrap()
                .outbound
                .remove(0),
            _ => panic!("expected session-init"),
        };

        // B handles pq-session-init, replies with pq-session-ack.
        let pq_session_ack = proto_b
            .handle_message("02", &key_b, &commitment_a, 0, pq_session_init)
            .unwrap()
            .outbound
            .remove(0);

        // A handles pq-session-ack, reveals B's key, replies with session-ack.
        let outcome_a = proto_a.handle_message("03", &key_a, &commitment_b, 0, pq_session_ack).unwrap();
        assert_eq!(outcome_a.revealed_key.as_ref().unwrap().index(), key_b.index());
        let session_ack = outcome_a.outbound.into_iter().next().unwrap();

        // B handles session-ack, reveals A's key, replies with session-done.
        let outcome_b = proto_b.handle_message("02", &key_b, &commitment_a, 0, session_ack).unwrap();
        assert_eq!(outcome_b.revealed_key.as_ref().unwrap().index(), key_a.index());
        assert!(outcome_b.became_done);
        let session_done = outcome_b.outbound.into_iter().next().unwrap();

        // A handles session-done, completing the handshake.
        let outcome_final = proto_a.handle_message("03", &key_a, &commitment_b, 0, session_done).unwrap();
        assert!(outcome_final.became_done);

        assert_eq!(proto_a.session("03").unwrap().status(), ProtocolStatus::Done);
        assert_eq!(proto_b.session("02").unwrap().status(), ProtocolStatus::Done);
    }

    #[test]
    fn test_responder_never_starts_session() {
        let (identity_a, key_a) = participant("02");
        let mut proto_a = PairwiseProtocol::new(identity_a);
        assert!(proto_a.start_session("03", &key_a).unwrap().is_none());
    }

    #[test]
    fn test_out_of_sequence_message_is_error_but_does_not_terminate() {
        let (identity_a, key_a) = participant("02");
        let (identity_b, _) = participant("03");
        let commitment_b = commit_identity("03", identity_b.kem_public().as_bytes(), identity_b.classical_public().as_bytes());

        let mut proto_a = PairwiseProtocol::new(identity_a);
        let bogus_ack = OlmMessage::SessionAck(messages::SessionAckPayload {
            ciphertext: String::new(),
            pq_ciphertext: String::new(),
        });
        let result = proto_a.handle_message("03", &key_a, &commitment_b, 0, bogus_ack);
        assert!(result.is_err());
        // §7 ProtocolSequence MUST NOT auto-transition: the session is left in
        // whatever state it was in (freshly created, ready-to-start) rather
        // than being torn down to `terminated`.
        assert_eq!(proto_a.session("03").unwrap().status(), ProtocolStatus::ReadyToStart);
    }

    #[test]
    fn test_duplicate_session_init_is_ignored_not_fatal() {
        let (identity_a, key_a) = participant("02"); // Responder
        let (identity_b, key_b) = participant("03"); // Initiator

        let commitment_b = commit_identity("03", identity_b.kem_public().as_bytes(), identity_b.classical_public().as_bytes());

        let mut proto_b = PairwiseProtocol::new(identity_b);
        let session_init = proto_b.start_session("02", &key_b).unwrap().unwrap();

        let mut proto_a = PairwiseProtocol::new(identity_a);
        proto_a
            .handle_message("03", &key_a, &commitment_b, 0, session_init.clone())
            .unwrap();
        assert_eq!(proto_a.session("03").unwrap().status(), ProtocolStatus::WaitingPqSessionAck);

        // A retransmitted session-init arrives after the session has already
        // advanced: it must be ignored, not treated as out-of-sequence.
        let outcome = proto_a.handle_message("03", &key_a, &commitment_b, 0, session_init).unwrap();
        assert!(outcome.outbound.is_empty());
        assert_eq!(proto_a.session("03").unwrap().status(), ProtocolStatus::WaitingPqSessionAck);
    }

    #[test]
    fn test_key_info_before_session_established_errors_without_terminating_or_revealing() {
        let (identity_a, key_a) = participant("02");
        let (identity_b, _) = participant("03");
        let commitment_b = commit_identity("03", identity_b.kem_public().as_bytes(), identity_b.classical_public().as_bytes());

        let mut proto_a = PairwiseProtocol::new(identity_a);
        // Drive proto_a's session with "03" to WaitingPqSessionInit (Responder
        // has not yet sent session-init, so this path uses an Initiator view
        // instead: start a session so the status is pending, short of done).
        let key_info = OlmMessage::KeyInfo(messages::KeyInfoPayload {
            ciphertext: String::new(),
            pq_ciphertext: String::new(),
        });
        let result = proto_a.handle_message("03", &key_a, &commitment_b, 0, key_info);
        assert!(result.is_err(), "key-info before done/waiting-done must be a protocol sequence error");
        assert_eq!(
            proto_a.session("03").unwrap().status(),
            ProtocolStatus::ReadyToStart,
            "a status error must not auto-transition the session"
        );
    }

    #[test]
    fn test_check_timeouts_terminates_pending_session_only() {
        let (identity_a, key_a) = participant("02");
        let (identity_b, key_b) = participant("03");
        let mut proto_b = PairwiseProtocol::new(identity_b);
        let mut proto_a = PairwiseProtocol::new(identity_a);

        // Start a session from B so it exists and is pending (not ready-to-start).
        proto_b.start_session("02", &key_b).unwrap();
        assert_eq!(proto_b.session("02").unwrap().status(), ProtocolStatus::WaitingPqSessionInit);

        let now = std::time::Instant::now();
        let past_budget = now + std::time::Duration::from_secs(21);

        // A has no sessions yet: nothing to time out.
        assert!(proto_a.check_timeouts(past_budget, std::time::Duration::from_secs(20)).is_empty());

        let expired = proto_b.check_timeouts(past_budget, std::time::Duration::from_secs(20));
        assert_eq!(expired, vec!["02".to_string()]);
        assert_eq!(proto_b.session("02").unwrap().status(), ProtocolStatus::Terminated);
        let _ = key_a;
    }

    #[test]
    fn test_check_timeouts_leaves_fresh_session_alone() {
        let (identity_b, key_b) = participant("03");
        let mut proto_b = PairwiseProtocol::new(identity_b);
        proto_b.start_session("02", &key_b).unwrap();

        let expired = proto_b.check_timeouts(std::time::Instant::now(), std::time::Duration::from_secs(20));
        assert!(expired.is_empty());
        assert_eq!(proto_b.session("02").unwrap().status(), ProtocolStatus::WaitingPqSessionInit);
    }

    #[test]
    fn test_tampered_identity_commitment_is_rejected() {
        let (identity_a, key_a) = participant("02");
        let (identity_b, key_b) = participant("03");

        let mut proto_b = PairwiseProtocol::new(identity_b);
        let session_init = proto_b.start_session("02", &key_b).unwrap().unwrap();

        let mut proto_a = PairwiseProtocol::new(identity_a);
        let wrong_commitment = commit_identity("not-03", b"wrong", b"wrong");
        let result = proto_a.handle_message("03", &key_a, &wrong_commitment, 0, session_init);
        assert!(result.is_err());
    }
}
