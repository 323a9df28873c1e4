//! # Pairwise Session Data and State Machine
//!
//! One [`SessionData`] per peer, created on first interaction and destroyed
//! on peer-leave or conference-leave. Drives the handshake described in the
//! component design: a classical one-sided X3DH-style key agreement
//! (established as soon as a one-time key and an identity public key have
//! crossed the wire) layered with a Kyber-512 KEM round trip, combined via
//! [`HkdfSha256::derive_aead_key`] into the session's effective AEAD key.
//!
//! This crate deliberately simplifies the classical side to a single
//! HKDF-free session key derived directly from one Diffie-Hellman output,
//! not a full forward-ratcheting Double Ratchet: only the media key the
//! channel carries needs to advance on join/leave, not the pairwise channel
//! itself.
//!
//! Grounded on the parent crate's `sync::handshake::HybridHandshake`
//! initiator/responder split and `crypto::kdf`/`crypto::kem`/`crypto::ecdh`
//! for the primitives.

use crate::crypto::aead::{AeadCipher, AeadIv, AeadKey, NONCE_SIZE};
use crate::crypto::ecdh::{EcdhSharedSecret, X25519ECDH, X25519PublicKeyBytes};
use crate::crypto::hash::HashOutput;
use crate::crypto::kem::{KyberCipherText, KyberKEM, KyberPublicKeyBytes, KyberSharedSecret};
use crate::crypto::{commit_media_key, CryptoError, HkdfSha256};
use crate::identity::{IdentityMaterial, OneTimeKeyPair};
use crate::mediakey::MediaKey;
use rand::RngCore;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// `PROTOCOL_STATUS`: the pairwise handshake's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStatus {
    /// No messages exchanged yet.
    ReadyToStart,
    /// Sent `session-init`; awaiting `pq-session-init`.
    WaitingPqSessionInit,
    /// Sent `pq-session-init`; awaiting `pq-session-ack`.
    WaitingPqSessionAck,
    /// Sent `pq-session-ack`; awaiting `session-ack`.
    WaitingSessionAck,
    /// Sent `session-ack`; awaiting `session-done`.
    WaitingDone,
    /// Handshake complete; channel usable for `key-info`.
    Done,
    /// Session torn down by error, timeout, or peer/conference leave.
    Terminated,
}

impl ProtocolStatus {
    /// `true` for `Done` and `WaitingDone`, the two states in which an
    /// unsolicited `key-info` is acceptable (§4.3 tie-break rule).
    pub fn accepts_key_info(&self) -> bool {
        matches!(self, ProtocolStatus::Done | ProtocolStatus::WaitingDone)
    }
}

/// Which side of the pair the local participant plays.
///
/// The participant with the lexicographically larger ID is the
/// [`Role::Initiator`] and sends `session-init` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends `session-init`, `pq-session-ack`, `session-done`.
    Initiator,
    /// Sends `pq-session-init`, `session-ack`.
    Responder,
}

/// Determine the local role for a `(local_id, peer_id)` pair.
pub fn role_for(local_id: &str, peer_id: &str) -> Role {
    if local_id > peer_id {
        Role::Initiator
    } else {
        Role::Responder
    }
}

/// A minimal one-sided X3DH-style classical session: a single AEAD key
/// derived directly from one Diffie-Hellman output, used to encrypt the
/// media-key commitment (`pq-session-init`) and, alongside the PQ-derived
/// key, the media key itself (`pq-session-ack`/`session-ack`/`key-info`).
pub struct ClassicalSession {
    cipher: AeadCipher,
}

impl ClassicalSession {
    /// Establish from a raw Diffie-Hellman output. The X25519 output is
    /// used directly as the AES-256-GCM key: no separate KDF step, since
    /// both sides compute the identical 32 bytes and the AEAD call that
    /// follows already commits to a fresh random IV per message.
    pub fn from_shared_secret(secret: &EcdhSharedSecret) -> crate::crypto::Result<Self> {
        let key = AeadKey::from_bytes(secret.as_bytes())?;
        Ok(Self {
            cipher: AeadCipher::new(&key),
        })
    }

    /// Encrypt `plaintext`, returning `iv || ciphertext+tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> crate::crypto::Result<Vec<u8>> {
        let mut iv_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut iv_bytes);
        let iv = AeadIv::from_bytes(&iv_bytes)?;
        let ciphertext = self.cipher.encrypt(&iv, plaintext, b"")?;
        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&iv_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt a blob produced by [`Self::encrypt`].
    pub fn decrypt(&self, blob: &[u8]) -> crate::crypto::Result<Vec<u8>> {
        if blob.len() < NONCE_SIZE {
            return Err(CryptoError::bad_input("classical session blob shorter than IV"));
        }
        let (iv_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
        let iv = AeadIv::from_bytes(iv_bytes)?;
        self.cipher.decrypt(&iv, ciphertext, b"")
    }
}

/// Encrypt a media key's raw shares (`olm_share ‖ pq_share ‖ index`) under
/// a session, producing the wire-format blob carried in
/// `pq-session-ack`/`session-ack`/`key-info`.
fn encrypt_media_key(session: &dyn Fn(&[u8]) -> crate::crypto::Result<Vec<u8>>, key: &MediaKey) -> crate::crypto::Result<Vec<u8>> {
    let mut plaintext = Vec::with_capacity(72);
    plaintext.extend_from_slice(key.olm_share());
    plaintext.extend_from_slice(key.pq_share());
    plaintext.extend_from_slice(&key.index().to_be_bytes());
    session(&plaintext)
}

/// Parse a hex-encoded commitment as carried in `session-init.commitment`.
fn hash_output_from_hex(value: &str) -> crate::crypto::Result<HashOutput> {
    let bytes = hex::decode(value).map_err(|e| CryptoError::bad_input(format!("invalid commitment hex: {e}")))?;
    hash_output_from_slice(&bytes)
}

/// Rebuild a [`HashOutput`] from a decrypted 32-byte commitment blob.
fn hash_output_from_slice(bytes: &[u8]) -> crate::crypto::Result<HashOutput> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::bad_input("commitment has wrong length"))?;
    Ok(HashOutput::from_bytes(array))
}

fn decrypt_media_key(
    session: &dyn Fn(&[u8]) -> crate::crypto::Result<Vec<u8>>,
    user_id: &str,
    blob: &[u8],
) -> crate::crypto::Result<MediaKey> {
    let plaintext = session(blob)?;
    if plaintext.len() != 72 {
        return Err(CryptoError::bad_input("decrypted media key has wrong length"));
    }
    let mut olm_share = [0u8; 32];
    let mut pq_share = [0u8; 32];
    olm_share.copy_from_slice(&plaintext[0..32]);
    pq_share.copy_from_slice(&plaintext[32..64]);
    let mut index_bytes = [0u8; 8];
    index_bytes.copy_from_slice(&plaintext[64..72]);
    let index = u64::from_be_bytes(index_bytes);
    Ok(MediaKey::from_shares(user_id, olm_share, pq_share, index))
}

/// Per-peer pairwise session state.
pub struct SessionData {
    peer_id: String,
    role: Role,
    status: ProtocolStatus,

    // Classical one-sided X3DH material.
    local_one_time: Option<OneTimeKeyPair>,
    peer_one_time_public: Option<X25519PublicKeyBytes>,
    classical_session: Option<ClassicalSession>,

    // Identity material learned from the peer, verified against presence.
    peer_kem_public: Option<KyberPublicKeyBytes>,
    peer_classical_public: Option<X25519PublicKeyBytes>,

    // Hybrid PQ key agreement.
    pq_secret_a: Option<KyberSharedSecret>,
    pq_secret_b: Option<KyberSharedSecret>,
    pq_cipher: Option<AeadCipher>,

    // Commitment bookkeeping.
    peer_media_commitment: Option<HashOutput>,
    key_to_send: Option<MediaKey>,

    started_at: Instant,
    pub(crate) already_logged: AtomicBool,
}

impl SessionData {
    /// Create a fresh session in `ready-to-start` for `peer_id`.
    pub fn new(local_id: &str, peer_id: impl Into<String>) -> Self {
        let peer_id = peer_id.into();
        let role = role_for(local_id, &peer_id);
        Self {
            peer_id,
            role,
            status: ProtocolStatus::ReadyToStart,
            local_one_time: None,
            peer_one_time_public: None,
            classical_session: None,
            peer_kem_public: None,
            peer_classical_public: None,
            pq_secret_a: None,
            pq_secret_b: None,
            pq_cipher: None,
            peer_media_commitment: None,
            key_to_send: None,
            started_at: Instant::now(),
            already_logged: AtomicBool::new(false),
        }
    }

    /// `true` if this session is still short of `done` and has been pending
    /// (since creation) for at least `timeout` as of `now` (§5 cancellation
    /// semantics: timeout is one of the three ways a pending handshake
    /// resolves, alongside `session-done` arrival and peer-leave).
    pub fn is_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        !matches!(self.status, ProtocolStatus::Done | ProtocolStatus::Terminated) && now.saturating_duration_since(self.started_at) >= timeout
    }

    /// The peer this session is with.
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// This side's role in the handshake.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current handshake state.
    pub fn status(&self) -> ProtocolStatus {
        self.status
    }

    /// Mark the session terminated (error, timeout, or a leave event).
    pub fn terminate(&mut self) {
        self.status = ProtocolStatus::Terminated;
    }

    fn classical_encrypt(&self, plaintext: &[u8]) -> crate::crypto::Result<Vec<u8>> {
        self.classical_session
            .as_ref()
            .ok_or_else(|| CryptoError::internal("classical session not yet established"))?
            .encrypt(plaintext)
    }

    fn classical_decrypt(&self, blob: &[u8]) -> crate::crypto::Result<Vec<u8>> {
        self.classical_session
            .as_ref()
            .ok_or_else(|| CryptoError::internal("classical session not yet established"))?
            .decrypt(blob)
    }

    fn pq_encrypt(&self, plaintext: &[u8]) -> crate::crypto::Result<Vec<u8>> {
        let cipher = self
            .pq_cipher
            .as_ref()
            .ok_or_else(|| CryptoError::internal("PQ session key not yet established"))?;
        let mut iv_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut iv_bytes);
        let iv = AeadIv::from_bytes(&iv_bytes)?;
        let ciphertext = cipher.encrypt(&iv, plaintext, b"")?;
        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&iv_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn pq_decrypt(&self, blob: &[u8]) -> crate::crypto::Result<Vec<u8>> {
        let cipher = self
            .pq_cipher
            .as_ref()
            .ok_or_else(|| CryptoError::internal("PQ session key not yet established"))?;
        if blob.len() < NONCE_SIZE {
            return Err(CryptoError::bad_input("PQ ciphertext blob shorter than IV"));
        }
        let (iv_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
        let iv = AeadIv::from_bytes(iv_bytes)?;
        cipher.decrypt(&iv, ciphertext, b"")
    }

    /// Snapshot `local_key` as the key this session promises (and will
    /// reveal once the handshake completes) when first leaving
    /// `ready-to-start`.
    fn snapshot_key_to_send(&mut self, local_key: &MediaKey) {
        if self.key_to_send.is_none() {
            self.key_to_send = Some(local_key.clone());
        }
    }

    /// Initiator-only: emit `session-init` and move to `waiting-pq-session-init`.
    ///
    /// # Errors
    /// Returns `CryptoError` on one-time keypair failures (infallible in
    /// practice; surfaced for uniformity with the rest of the module).
    pub fn start(
        &mut self,
        identity: &IdentityMaterial,
        local_key: &MediaKey,
    ) -> crate::crypto::Result<super::messages::OlmMessage> {
        use super::messages::{OlmMessage, SessionInitPayload};

        debug_assert_eq!(self.role, Role::Initiator);
        self.snapshot_key_to_send(local_key);

        let one_time = OneTimeKeyPair::generate();
        let ot_public = crate::identity::encode_base64(one_time.public().as_bytes());
        self.local_one_time = Some(one_time);

        let commitment = commit_media_key(
            identity.participant_id(),
            local_key.olm_share(),
            local_key.pq_share(),
            local_key.index(),
        );

        self.status = ProtocolStatus::WaitingPqSessionInit;

        Ok(OlmMessage::SessionInit(SessionInitPayload {
            ot_key: ot_public,
            public_key: identity.classical_public_base64(),
            public_kyber_key: identity.kem_public_base64(),
            commitment: commitment.to_hex(),
        }))
    }

    /// Responder-only: handle an incoming `session-init`.
    ///
    /// `expected_commitment` is the peer's identity commitment published
    /// via presence; a mismatch against the keys carried in the message is
    /// a fatal MITM signal (§4.3, scenario S6).
    #[allow(clippy::too_many_arguments)]
    pub fn handle_session_init(
        &mut self,
        identity: &IdentityMaterial,
        local_key: &MediaKey,
        payload: &super::messages::SessionInitPayload,
        expected_identity_commitment: &HashOutput,
    ) -> crate::crypto::Result<super::messages::OlmMessage> {
        use super::messages::{OlmMessage, PqSessionInitPayload};

        debug_assert_eq!(self.role, Role::Responder);
        self.snapshot_key_to_send(local_key);

        let peer_kem_pub = KyberPublicKeyBytes::from_bytes(&crate::identity::decode_base64(&payload.public_kyber_key)?)?;
        let peer_classical_pub =
            X25519PublicKeyBytes::from_bytes(&crate::identity::decode_base64(&payload.public_key)?)?;
        let recomputed = crate::crypto::commit_identity(&self.peer_id, peer_kem_pub.as_bytes(), peer_classical_pub.as_bytes());
        if &recomputed != expected_identity_commitment {
            self.status = ProtocolStatus::Terminated;
            return Err(CryptoError::internal("identity commitment mismatch"));
        }

        let peer_ot_public = X25519PublicKeyBytes::from_bytes(&crate::identity::decode_base64(&payload.ot_key)?)?;
        self.peer_one_time_public = Some(peer_ot_public);
        self.peer_kem_public = Some(peer_kem_pub.clone());
        self.peer_classical_public = Some(peer_classical_pub);

        let peer_media_commitment = hash_output_from_hex(&payload.commitment)?;
        self.peer_media_commitment = Some(peer_media_commitment);

        // Classical session: ECDH(local identity secret, peer one-time public).
        let classical_secret = X25519ECDH::diffie_hellman(identity.classical_secret(), self.peer_one_time_public.as_ref().unwrap())?;
        self.classical_session = Some(ClassicalSession::from_shared_secret(&classical_secret)?);

        // Responder encapsulates first: this is "Side A"'s secret (s_a).
        let (secret_a, ciphertext) = KyberKEM::encapsulate(&peer_kem_pub)?;
        self.pq_secret_a = Some(secret_a);

        let self_commitment = commit_media_key(
            identity.participant_id(),
            local_key.olm_share(),
            local_key.pq_share(),
            local_key.index(),
        );
        let encrypted_commitment = self.classical_encrypt(self_commitment.as_bytes())?;

        self.status = ProtocolStatus::WaitingPqSessionAck;

        Ok(OlmMessage::PqSessionInit(PqSessionInitPayload {
            encaps_kyber: crate::identity::encode_base64(ciphertext.as_bytes()),
            public_key: identity.classical_public_base64(),
            public_kyber_key: identity.kem_public_base64(),
            ciphertext: crate::identity::encode_base64(&encrypted_commitment),
        }))
    }

    /// Initiator-only: handle an incoming `pq-session-init`.
    pub fn handle_pq_session_init(
        &mut self,
        identity: &IdentityMaterial,
        local_key: &MediaKey,
        payload: &super::messages::PqSessionInitPayload,
        expected_identity_commitment: &HashOutput,
    ) -> crate::crypto::Result<super::messages::OlmMessage> {
        use super::messages::{OlmMessage, PqSessionAckPayload};

        debug_assert_eq!(self.role, Role::Initiator);

        let peer_kem_pub = KyberPublicKeyBytes::from_bytes(&crate::identity::decode_base64(&payload.public_kyber_key)?)?;
        let peer_classical_pub =
            X25519PublicKeyBytes::from_bytes(&crate::identity::decode_base64(&payload.public_key)?)?;
        let recomputed = crate::crypto::commit_identity(&self.peer_id, peer_kem_pub.as_bytes(), peer_classical_pub.as_bytes());
        if &recomputed != expected_identity_commitment {
            self.status = ProtocolStatus::Terminated;
            return Err(CryptoError::internal("identity commitment mismatch"));
        }
        self.peer_kem_public = Some(peer_kem_pub);
        self.peer_classical_public = Some(peer_classical_pub.clone());

        // Classical session: ECDH(local one-time secret, peer identity public).
        let one_time = self
            .local_one_time
            .take()
            .ok_or_else(|| CryptoError::internal("one-time key already consumed"))?;
        let classical_secret = X25519ECDH::diffie_hellman(one_time.secret(), &peer_classical_pub)?;
        self.classical_session = Some(ClassicalSession::from_shared_secret(&classical_secret)?);

        let encrypted_commitment_blob = crate::identity::decode_base64(&payload.ciphertext)?;
        let commitment_bytes = self.classical_decrypt(&encrypted_commitment_blob)?;
        self.peer_media_commitment = Some(hash_output_from_slice(&commitment_bytes)?);

        // Decapsulate Responder's secret (s_a).
        let kyber_ct = KyberCipherText::from_bytes(&crate::identity::decode_base64(&payload.encaps_kyber)?)?;
        let secret_a = KyberKEM::decapsulate(identity.kem_secret(), &kyber_ct)?;
        self.pq_secret_a = Some(secret_a);

        // Initiator encapsulates second: s_b.
        let (secret_b, ciphertext_b) = KyberKEM::encapsulate(&peer_kem_pub_ref(&self.peer_kem_public)?)?;
        let aead_key_bytes = HkdfSha256::derive_aead_key(
            self.pq_secret_a.as_ref().unwrap().as_bytes(),
            secret_b.as_bytes(),
        )?;
        self.pq_cipher = Some(AeadCipher::new(&AeadKey::from_bytes(&aead_key_bytes)?));
        self.pq_secret_b = Some(secret_b);

        let classical_blob = {
            let session = self.classical_session.as_ref().unwrap();
            encrypt_media_key(&|pt| session.encrypt(pt), local_key)?
        };
        let pq_blob = encrypt_media_key(&|pt| self.pq_encrypt(pt), local_key)?;

        self.status = ProtocolStatus::WaitingSessionAck;

        Ok(OlmMessage::PqSessionAck(PqSessionAckPayload {
            encaps_kyber: crate::identity::encode_base64(ciphertext_b.as_bytes()),
            ciphertext: crate::identity::encode_base64(&classical_blob),
            pq_ciphertext: crate::identity::encode_base64(&pq_blob),
        }))
    }

    /// Responder-only: handle an incoming `pq-session-ack`. Returns the
    /// outbound `session-ack` plus the Initiator's revealed, verified media key.
    pub fn handle_pq_session_ack(
        &mut self,
        identity: &IdentityMaterial,
        local_key: &MediaKey,
        payload: &super::messages::PqSessionAckPayload,
    ) -> crate::crypto::Result<(super::messages::OlmMessage, MediaKey)> {
        use super::messages::{OlmMessage, SessionAckPayload};

        debug_assert_eq!(self.role, Role::Responder);

        let kyber_ct = KyberCipherText::from_bytes(&crate::identity::decode_base64(&payload.encaps_kyber)?)?;
        let secret_b = KyberKEM::decapsulate(identity.kem_secret(), &kyber_ct)?;
        let aead_key_bytes = HkdfSha256::derive_aead_key(
            self.pq_secret_a.as_ref().unwrap().as_bytes(),
            secret_b.as_bytes(),
        )?;
        self.pq_cipher = Some(AeadCipher::new(&AeadKey::from_bytes(&aead_key_bytes)?));
        self.pq_secret_b = Some(secret_b);

        let classical_blob = crate::identity::decode_base64(&payload.ciphertext)?;
        let pq_blob = crate::identity::decode_base64(&payload.pq_ciphertext)?;
        let revealed = self.reveal_and_verify_media_key(&classical_blob, &pq_blob)?;

        let self_classical_blob = {
            let session = self.classical_session.as_ref().unwrap();
            encrypt_media_key(&|pt| session.encrypt(pt), local_key)?
        };
        let self_pq_blob = encrypt_media_key(&|pt| self.pq_encrypt(pt), local_key)?;

        self.status = ProtocolStatus::WaitingDone;

        Ok((
            OlmMessage::SessionAck(SessionAckPayload {
                ciphertext: crate::identity::encode_base64(&self_classical_blob),
                pq_ciphertext: crate::identity::encode_base64(&self_pq_blob),
            }),
            revealed,
        ))
    }

    /// Initiator-only: handle an incoming `session-ack`. Returns the
    /// outbound `session-done` (and reconciliation `key-info` if the local
    /// key changed since `key_to_send`), plus the Responder's revealed,
    /// verified media key.
    pub fn handle_session_ack(
        &mut self,
        local_key: &MediaKey,
        payload: &super::messages::SessionAckPayload,
    ) -> crate::crypto::Result<(Vec<super::messages::OlmMessage>, MediaKey)> {
        use super::messages::{OlmMessage, SessionDonePayload};

        debug_assert_eq!(self.role, Role::Initiator);

        let classical_blob = crate::identity::decode_base64(&payload.ciphertext)?;
        let pq_blob = crate::identity::decode_base64(&payload.pq_ciphertext)?;
        let revealed = self.reveal_and_verify_media_key(&classical_blob, &pq_blob)?;

        self.status = ProtocolStatus::Done;

        let mut outbound = vec![OlmMessage::SessionDone(SessionDonePayload::default())];
        if let Some(reconciled) = self.reconciliation_key_info(local_key)? {
            outbound.push(reconciled);
        }

        Ok((outbound, revealed))
    }

    /// Responder-only: handle an incoming `session-done`, completing the handshake.
    pub fn handle_session_done(&mut self, local_key: &MediaKey) -> crate::crypto::Result<Option<super::messages::OlmMessage>> {
        debug_assert_eq!(self.role, Role::Responder);
        self.status = ProtocolStatus::Done;
        self.reconciliation_key_info(local_key)
    }

    /// Encrypt `local_key` for an out-of-band `key-info` push over an
    /// already-`Done` channel (join-ratchet reconciliation or leave-rotate
    /// broadcast).
    pub fn build_key_info(&self, local_key: &MediaKey) -> crate::crypto::Result<super::messages::OlmMessage> {
        use super::messages::{KeyInfoPayload, OlmMessage};

        let classical_blob = {
            let session = self
                .classical_session
                .as_ref()
                .ok_or_else(|| CryptoError::internal("classical session not established"))?;
            encrypt_media_key(&|pt| session.encrypt(pt), local_key)?
        };
        let pq_blob = encrypt_media_key(&|pt| self.pq_encrypt(pt), local_key)?;

        Ok(OlmMessage::KeyInfo(KeyInfoPayload {
            ciphertext: crate::identity::encode_base64(&classical_blob),
            pq_ciphertext: crate::identity::encode_base64(&pq_blob),
        }))
    }

    /// Handle an incoming `key-info`: decrypt and verify against the
    /// standing media-key commitment, accepting only a strictly increasing
    /// `index` (§5 ordering guarantee). Returns `None` if the update is
    /// stale and should be dropped.
    pub fn handle_key_info(
        &self,
        payload: &super::messages::KeyInfoPayload,
        last_installed_index: u64,
    ) -> crate::crypto::Result<Option<MediaKey>> {
        let classical_blob = crate::identity::decode_base64(&payload.ciphertext)?;
        let pq_blob = crate::identity::decode_base64(&payload.pq_ciphertext)?;
        let revealed = self.reveal_and_verify_media_key(&classical_blob, &pq_blob)?;
        if revealed.index() <= last_installed_index {
            return Ok(None);
        }
        Ok(Some(revealed))
    }

    fn reveal_and_verify_media_key(&self, classical_blob: &[u8], pq_blob: &[u8]) -> crate::crypto::Result<MediaKey> {
        let from_classical = decrypt_media_key(&|b| self.classical_decrypt(b), &self.peer_id, classical_blob)?;
        let from_pq = decrypt_media_key(&|b| self.pq_decrypt(b), &self.peer_id, pq_blob)?;
        if from_classical.olm_share() != from_pq.olm_share()
            || from_classical.pq_share() != from_pq.pq_share()
            || from_classical.index() != from_pq.index()
        {
            return Err(CryptoError::internal(
                "classical and PQ channel disagree on revealed media key",
            ));
        }

        let expected = self
            .peer_media_commitment
            .as_ref()
            .ok_or_else(|| CryptoError::internal("no pending media-key commitment"))?;
        let recomputed = commit_media_key(&self.peer_id, from_classical.olm_share(), from_classical.pq_share(), from_classical.index());
        if &recomputed != expected {
            return Err(CryptoError::CommitmentMismatch);
        }

        Ok(from_classical)
    }

    fn reconciliation_key_info(&mut self, local_key: &MediaKey) -> crate::crypto::Result<Option<super::messages::OlmMessage>> {
        let snapshot = self.key_to_send.as_ref();
        let needs_push = match snapshot {
            Some(snapshot) => snapshot.index() != local_key.index(),
            None => false,
        };
        if !needs_push {
            return Ok(None);
        }
        self.key_to_send = Some(local_key.clone());
        Ok(Some(self.build_key_info(local_key)?))
    }

}

fn peer_kem_pub_ref(opt: &Option<KyberPublicKeyBytes>) -> crate::crypto::Result<&KyberPublicKeyBytes> {
    opt.as_ref().ok_or_else(|| CryptoError::internal("peer KEM public key not yet known"))
}
