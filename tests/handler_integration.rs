//! End-to-end scenarios driving [`confcrypt_core::GroupKeyHandler`] across
//! several participants, mirroring the concrete scenarios described for the
//! group key handler: three-party enable, join, leave, a disable/enable
//! cycle, and a tampered identity commitment.
//!
//! Every handler here is wired by hand, standing in for the host conference
//! (presence publication and signalling delivery) that this crate treats as
//! an external collaborator.

use confcrypt_core::crypto::hash::HashOutput;
use confcrypt_core::handler::HandlerConfig;
use confcrypt_core::protocol::Envelope;
use confcrypt_core::GroupKeyHandler;
use std::collections::HashMap;

/// A miniature in-memory signalling fabric: every handler registered here
/// can be driven by pumping its outbound envelopes to their recipients
/// until the mesh quiesces.
struct Fabric {
    handlers: HashMap<String, GroupKeyHandler>,
}

impl Fabric {
    fn new(ids: &[&str]) -> Self {
        let mut handlers = HashMap::new();
        for id in ids {
            handlers.insert(id.to_string(), GroupKeyHandler::new(*id, HandlerConfig::default()));
        }
        Self { handlers }
    }

    /// Exchange identity commitments between every pair, as the host would
    /// via signalling presence at conference join.
    fn exchange_presence(&mut self) {
        let commitments: Vec<(String, HashOutput)> = self
            .handlers
            .iter()
            .filter_map(|(id, h)| h.identity_commitment().map(|c| (id.clone(), c.clone())))
            .collect();
        for (id, handler) in self.handlers.iter_mut() {
            for (peer_id, commitment) in &commitments {
                if peer_id != id {
                    handler.set_peer_identity_commitment(peer_id, commitment.clone());
                }
            }
        }
    }

    /// Deliver every pending outbound envelope produced by `enable`/`join`/
    /// `leave` and drain the resulting cascade until nobody has anything
    /// left to send.
    fn drain(&mut self, mut pending: Vec<(String, String, Envelope)>) {
        while let Some((from, to, envelope)) = pending.pop() {
            let outcome = self
                .handlers
                .get_mut(&to)
                .unwrap_or_else(|| panic!("no handler registered for {to}"))
                .on_signalling_message(&from, envelope)
                .unwrap();
            for signal in outcome.outgoing {
                pending.push((to.clone(), signal.peer_id, signal.envelope));
            }
        }
    }

    fn enable_all(&mut self) {
        let ids: Vec<String> = self.handlers.keys().cloned().collect();
        let mut pending = Vec::new();
        for id in ids {
            let outcome = self.handlers.get_mut(&id).unwrap().set_enabled(true).unwrap();
            for signal in outcome.outgoing {
                pending.push((id.clone(), signal.peer_id, signal.envelope));
            }
        }
        self.drain(pending);
    }
}

#[test]
fn s1_three_party_enable_converges_every_pair() {
    let mut fabric = Fabric::new(&["03", "02", "01"]);
    fabric.exchange_presence();
    fabric.enable_all();

    for id in ["03", "02", "01"] {
        assert!(fabric.handlers[id].is_enabled());
        assert!(fabric.handlers[id].local_key().is_some());
    }

    // §8 invariant 1 / S1: the SAS is length 7 and identical across all
    // three participants once every pairwise handshake has converged.
    let sas_a = fabric.handlers["03"].current_sas();
    let sas_b = fabric.handlers["02"].current_sas();
    let sas_c = fabric.handlers["01"].current_sas();
    assert_eq!(sas_a.len(), 7);
    assert_eq!(sas_a, sas_b);
    assert_eq!(sas_a, sas_c);
}

#[test]
fn s2_join_ratchets_existing_members_and_converges_new_member() {
    let mut fabric = Fabric::new(&["03", "02", "01"]);
    fabric.exchange_presence();
    fabric.enable_all();

    let index_before: HashMap<String, u64> = fabric
        .handlers
        .iter()
        .map(|(id, h)| (id.clone(), h.local_key().unwrap().index()))
        .collect();

    // "04" joins: register it everywhere, exchange presence again, enable it.
    fabric.handlers.insert("04".to_string(), GroupKeyHandler::new("04", HandlerConfig::default()));
    fabric.exchange_presence();

    for id in ["03", "02", "01"] {
        let outcome = fabric.handlers.get_mut(id).unwrap().on_participant_joined("04").unwrap();
        assert!(outcome.outgoing.is_empty(), "join ratchets locally; nothing is sent to peers");
    }

    let mut pending = Vec::new();
    let outcome = fabric.handlers.get_mut("04").unwrap().set_enabled(true).unwrap();
    for signal in outcome.outgoing {
        pending.push(("04".to_string(), signal.peer_id, signal.envelope));
    }
    fabric.drain(pending);

    for id in ["03", "02", "01"] {
        let after = fabric.handlers[id].local_key().unwrap().index();
        assert!(after > index_before[id], "{id} must ratchet its key on join");
    }
    assert!(fabric.handlers["04"].local_key().is_some());

    // S2: after D's handshake converges with A/B/C, all four SASes match.
    let sas_a = fabric.handlers["03"].current_sas();
    let sas_b = fabric.handlers["02"].current_sas();
    let sas_c = fabric.handlers["01"].current_sas();
    let sas_d = fabric.handlers["04"].current_sas();
    assert_eq!(sas_a.len(), 7);
    assert_eq!(sas_a, sas_b);
    assert_eq!(sas_a, sas_c);
    assert_eq!(sas_a, sas_d);
}

#[test]
fn s3_leave_rotates_remaining_members_and_pushes_key_info() {
    let mut fabric = Fabric::new(&["03", "02", "01"]);
    fabric.exchange_presence();
    fabric.enable_all();

    let key_a_before = fabric.handlers["03"].local_key().unwrap().index();
    let key_b_before = fabric.handlers["02"].local_key().unwrap().index();
    let sas_before = fabric.handlers["03"].current_sas();

    // "01" leaves.
    fabric.handlers.remove("01");
    let mut pending = Vec::new();
    for id in ["03", "02"] {
        let outcome = fabric.handlers.get_mut(id).unwrap().on_participant_left("01").unwrap();
        for signal in outcome.outgoing {
            pending.push((id.to_string(), signal.peer_id, signal.envelope));
        }
    }
    fabric.drain(pending);

    assert!(fabric.handlers["03"].local_key().unwrap().index() > key_a_before);
    assert!(fabric.handlers["02"].local_key().unwrap().index() > key_b_before);

    // S3: the remaining SAS matches between A and B and differs from the
    // pre-leave SAS (C's rotated-away key and key-info push changed it).
    let sas_a_after = fabric.handlers["03"].current_sas();
    let sas_b_after = fabric.handlers["02"].current_sas();
    assert_eq!(sas_a_after.len(), 7);
    assert_eq!(sas_a_after, sas_b_after);
    assert_ne!(sas_a_after, sas_before);
}

#[test]
fn s4_disable_enable_cycle_strictly_advances_index() {
    let mut fabric = Fabric::new(&["03", "02"]);
    fabric.exchange_presence();
    fabric.enable_all();

    let before = fabric.handlers["03"].local_key().unwrap().index();

    for id in ["03", "02"] {
        fabric.handlers.get_mut(id).unwrap().set_enabled(false).unwrap();
    }
    for id in ["03", "02"] {
        assert!(fabric.handlers[id].local_key().is_none());
    }

    fabric.exchange_presence();
    fabric.enable_all();

    let after = fabric.handlers["03"].local_key().unwrap().index();
    assert!(after > before, "re-enabling must advance the media key index");
}

#[test]
fn s6_tampered_identity_commitment_never_reaches_done() {
    let mut fabric = Fabric::new(&["03", "02"]);

    // "03" has the larger id, so it initiates against "02" once it knows
    // "02" exists; the bogus commitment is the one "02" holds for "03".
    fabric.handlers.get_mut("03").unwrap().set_peer_identity_commitment("02", HashOutput::from_bytes([0u8; 32]));
    fabric.handlers.get_mut("02").unwrap().set_peer_identity_commitment("03", HashOutput::from_bytes([0xEE; 32]));

    let outcome_b = fabric.handlers.get_mut("02").unwrap().set_enabled(true).unwrap();
    assert!(outcome_b.outgoing.is_empty(), "02 has the smaller id: it never initiates");

    let outcome_a = fabric.handlers.get_mut("03").unwrap().set_enabled(true).unwrap();
    assert_eq!(outcome_a.outgoing.len(), 1, "03 has the larger id: it initiates against 02");

    let session_init = outcome_a.outgoing.into_iter().next().unwrap();
    let response = fabric
        .handlers
        .get_mut("02")
        .unwrap()
        .on_signalling_message("03", session_init.envelope)
        .unwrap();

    // "02" rejects "03"'s identity keys against the bogus commitment it
    // holds and replies with an `error`, never a `pq-session-init`.
    assert_eq!(response.outgoing.len(), 1);
    assert_eq!(response.outgoing[0].envelope.olm.type_name(), "error");
}
