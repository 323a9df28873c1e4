//! # Conference E2EE Core
//!
//! Hybrid post-quantum end-to-end encryption for multi-party real-time
//! conferences: a pairwise session-establishment state machine between every
//! pair of participants, a group-wide media-key lifecycle (distribute,
//! ratchet on join, rotate on leave), and a per-frame AEAD codec attached to
//! the media pipeline.
//!
//! ## Security Architecture
//!
//! - Every pairwise shared secret is hybrid: a classical X25519 agreement
//!   combined with a Kyber-512 KEM round trip, so compromise of either
//!   primitive alone does not break confidentiality.
//! - All secret key material implements `Zeroize`/`ZeroizeOnDrop`.
//! - A short authentication string is derived from the whole group's current
//!   key state so participants can detect a man-in-the-middle relay out of
//!   band.
//!
//! ## Module Organization
//!
//! - `crypto` — KEM, AEAD, ECDH, hash/KDF, commitments, and SAS derivation
//!   (§4.1).
//! - `identity` — per-participant long-term identity material (§3).
//! - `mediakey` — the per-participant media key and its ratchet/rotate
//!   operations (§3, §4.4).
//! - `codec` — the per-frame AEAD encode/decode pipeline (§4.2).
//! - `protocol` — the pairwise handshake state machine (§4.3).
//! - `handler` — the top-level group key orchestrator (§4.4).
//!
//! ## Safety Guarantees
//!
//! - All secret keys are automatically zeroized on drop.
//! - No plaintext key material is ever logged; crypto failures on the
//!   codec path are logged at most once per session to avoid log storms
//!   (§7).

#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

/// Cryptographic primitives module.
pub mod crypto;

/// Per-frame AEAD codec attached to the media pipeline.
pub mod codec;

/// Per-participant long-term identity material.
pub mod identity;

/// Top-level group key orchestrator.
pub mod handler;

/// Per-participant media key and its ratchet/rotate operations.
pub mod mediakey;

/// The pairwise handshake state machine.
pub mod protocol;

// Re-export common types at the crate root.
pub use crypto::{error::CryptoError, error::Result};
pub use handler::{GroupKeyHandler, HandlerConfig, HandlerError};
pub use identity::IdentityMaterial;
pub use mediakey::MediaKey;
