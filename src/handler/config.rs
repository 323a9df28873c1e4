//! Group key handler tunables.

use std::time::Duration;

/// Default time a pairwise handshake is allowed to sit short of `done`
/// before [`super::GroupKeyHandler`] treats the peer as unreachable.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

/// Default number of SAS bits derived per aggregation (7 emoji * 6 bits).
const DEFAULT_SAS_BIT_LENGTH: usize = 48;

/// Tunables for [`super::GroupKeyHandler`].
///
/// Grounded on the parent crate's `sync::handshake` timeout/backoff
/// constants pattern: fixed defaults exposed as `const`s, with builder-style
/// setters for callers that need to override them (tests, or a host that
/// wants a tighter handshake budget on a lossy signalling transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    handshake_timeout: Duration,
    sas_bit_length: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            sas_bit_length: DEFAULT_SAS_BIT_LENGTH,
        }
    }
}

impl HandlerConfig {
    /// Override the handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Override the number of SAS bits derived per aggregation.
    pub fn with_sas_bit_length(mut self, bits: usize) -> Self {
        self.sas_bit_length = bits;
        self
    }

    /// The configured handshake timeout.
    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    /// The configured SAS bit length.
    pub fn sas_bit_length(&self) -> usize {
        self.sas_bit_length
    }
}
