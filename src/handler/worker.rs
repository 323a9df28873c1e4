//! # Frame-Context Worker
//!
//! The single owner of every participant's [`FrameContext`], mirroring the
//! dedicated per-conference media-codec worker task described for this
//! component: installation, ratcheting, and teardown of frame contexts all
//! happen here, behind a small typed message surface
//! (`set_key`/`ratchet`/`cleanup`/`cleanup_all`) rather than through direct
//! field access from [`super::GroupKeyHandler`].
//!
//! This crate runs the worker in-line (no channel or background thread):
//! nothing else in this crate depends on an async runtime, and the frame
//! path here is synchronous per call, so a same-thread owner with a message-
//! shaped API gives the same separation of concerns without introducing a
//! runtime dependency nothing else uses.
//!
//! Grounded on `codec::FrameContext` for the per-participant state and on
//! `crypto::sas` for the SAS aggregation performed after every installation.

use crate::codec::FrameContext;
use crate::crypto::hash::HashOutput;
use crate::crypto::hash_participant_state;
use crate::mediakey::MediaKey;
use std::collections::BTreeMap;

/// Owns one [`FrameContext`] per participant (including the local one) and
/// recomputes the SAS aggregate whenever a key is installed.
pub struct FrameContextWorker {
    contexts: BTreeMap<String, FrameContext>,
    identity_commitments: BTreeMap<String, HashOutput>,
    sas_bit_length: usize,
    last_sas: Option<String>,
}

impl FrameContextWorker {
    /// Create an empty worker deriving `sas_bit_length` bits per aggregation.
    pub fn new(sas_bit_length: usize) -> Self {
        Self {
            contexts: BTreeMap::new(),
            identity_commitments: BTreeMap::new(),
            sas_bit_length,
            last_sas: None,
        }
    }

    /// `createKeys`/`setKey`: install (or replace) `pid`'s frame context and
    /// record its identity commitment for SAS aggregation.
    pub fn set_key(&mut self, pid: &str, key: MediaKey, identity_commitment: HashOutput) -> crate::crypto::Result<()> {
        match self.contexts.get_mut(pid) {
            Some(ctx) => ctx.install(key)?,
            None => {
                self.contexts.insert(pid.to_string(), FrameContext::new(key)?);
            }
        }
        self.identity_commitments.insert(pid.to_string(), identity_commitment);
        Ok(())
    }

    /// `setKeysCommitment`: update only the identity commitment used for SAS
    /// aggregation, leaving the installed key untouched.
    pub fn set_identity_commitment(&mut self, pid: &str, identity_commitment: HashOutput) {
        self.identity_commitments.insert(pid.to_string(), identity_commitment);
    }

    /// `ratchetKeys`: advance `pid`'s installed key by one ratchet step, used
    /// when a new participant joins.
    pub fn ratchet(&mut self, pid: &str) -> crate::crypto::Result<()> {
        let Some(ctx) = self.contexts.get_mut(pid) else {
            return Ok(());
        };
        let ratcheted = ctx.key().ratchet()?;
        ctx.install(ratcheted)
    }

    /// `cleanup`: drop `pid`'s frame context and identity commitment entirely.
    pub fn cleanup(&mut self, pid: &str) {
        self.contexts.remove(pid);
        self.identity_commitments.remove(pid);
    }

    /// `cleanupAll`: drop every frame context, used on `on_conference_left`
    /// and on `set_enabled(false)`.
    pub fn cleanup_all(&mut self) {
        self.contexts.clear();
        self.identity_commitments.clear();
        self.last_sas = None;
    }

    /// `encode`: encrypt `frame` under `pid`'s installed key. `None` if no
    /// context is installed for `pid`, or the underlying AEAD call fails.
    pub fn encode(&self, pid: &str, frame: &[u8]) -> Option<Vec<u8>> {
        self.contexts.get(pid)?.encode(frame)
    }

    /// `decode`: decrypt `frame` under `pid`'s installed key.
    pub fn decode(&self, pid: &str, frame: &[u8]) -> Option<Vec<u8>> {
        self.contexts.get(pid)?.decode(frame)
    }

    /// The key currently installed for `pid`, if any.
    pub fn installed_key(&self, pid: &str) -> Option<&MediaKey> {
        self.contexts.get(pid).map(FrameContext::key)
    }

    /// Build the sorted, concatenated aggregate state string §4.4 derives
    /// the SAS from, over every installed frame context that also has a
    /// recorded identity commitment.
    fn aggregate_state(&self) -> String {
        let mut entries: Vec<String> = Vec::with_capacity(self.contexts.len());
        for (pid, ctx) in &self.contexts {
            let Some(identity_commitment) = self.identity_commitments.get(pid) else {
                continue;
            };
            let key = ctx.key();
            let state = hash_participant_state(pid, key.olm_share(), key.pq_share(), key.index(), identity_commitment);
            entries.push(format!("{pid}{}", state.to_hex()));
        }
        entries.sort_unstable();
        entries.concat()
    }

    /// The current SAS, computed fresh from the installed frame contexts
    /// regardless of whether it has already been emitted. Used by callers
    /// that need the current value on demand (e.g. comparing SAS across
    /// participants) rather than only on change.
    pub fn current_sas(&self) -> Vec<(&'static str, &'static str)> {
        crate::crypto::sas::sas_emojis(&self.aggregate_state())
    }

    /// Recompute the SAS aggregate over every installed frame context that
    /// also has a recorded identity commitment, returning `Some` only when
    /// it differs from the last value returned (§4.4: "emitted whenever it
    /// changes").
    pub fn recompute_sas(&mut self) -> Option<Vec<(&'static str, &'static str)>> {
        let aggregate = self.aggregate_state();
        let bits = crate::crypto::sas::derive_sas_bits(&aggregate, self.sas_bit_length);
        let sas_key = hex::encode(&bits);

        if self.last_sas.as_deref() == Some(sas_key.as_str()) {
            return None;
        }
        self.last_sas = Some(sas_key);
        Some(crate::crypto::sas::sas_emojis(&aggregate))
    }

    /// True if a frame context is installed for `pid`.
    pub fn contains(&self, pid: &str) -> bool {
        self.contexts.contains_key(pid)
    }
}
