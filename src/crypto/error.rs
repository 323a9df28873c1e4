//! # Cryptographic Error Types
//!
//! Unified error handling for all cryptographic operations in this crate.
//!
//! ## Design Principles
//!
//! - **No Information Leakage**: Error messages never contain sensitive data
//! - **Detailed Context**: Each error provides actionable information
//! - **Type Safety**: Strongly typed errors prevent silent failures

use thiserror::Error;

/// Result type alias for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Unified error type for all cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation function failed
    #[error("Key derivation failed: {0}")]
    KdfError(String),

    /// Authenticated encryption/decryption operation failed
    ///
    /// This may occur due to:
    /// - Authentication tag verification failure (tampering detected)
    /// - Invalid nonce length
    /// - Invalid key length
    #[error("AEAD operation failed: {0}")]
    AeadError(String),

    /// Key encapsulation/decapsulation operation failed
    #[error("KEM encapsulation/decapsulation failed: {0}")]
    KemError(String),

    /// Elliptic curve Diffie-Hellman operation failed
    #[error("ECDH operation failed: {0}")]
    EcdhError(String),

    /// Invalid key length provided
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// The expected key length in bytes
        expected: usize,
        /// The actual key length provided in bytes
        actual: usize,
    },

    /// A commitment check failed.
    ///
    /// Covers both `commit_identity` mismatches (a peer's advertised
    /// identity keys don't match the presence-published commitment) and
    /// `commit_media_key` mismatches (a revealed media key doesn't match
    /// the commitment carried through the handshake).
    #[error("Commitment verification failed")]
    CommitmentMismatch,

    /// Verification failed
    #[error("Verification failed: Data integrity cannot be guaranteed")]
    VerificationFailed,

    /// Caller supplied empty or malformed input bytes.
    #[error("Bad input: {0}")]
    BadInput(String),

    /// Internal cryptographic error
    #[error("Internal cryptographic error: {0}")]
    InternalError(String),
}

impl CryptoError {
    /// Create a KDF error from a string message
    pub fn kdf(msg: impl Into<String>) -> Self {
        Self::KdfError(msg.into())
    }

    /// Create an AEAD error from a string message
    pub fn aead(msg: impl Into<String>) -> Self {
        Self::AeadError(msg.into())
    }

    /// Create a KEM error from a string message
    pub fn kem(msg: impl Into<String>) -> Self {
        Self::KemError(msg.into())
    }

    /// Create an ECDH error from a string message
    pub fn ecdh(msg: impl Into<String>) -> Self {
        Self::EcdhError(msg.into())
    }

    /// Create a bad-input error from a string message
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }

    /// Create an internal error from a string message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CryptoError::InvalidKeyLength {
            expected: 32,
            actual: 16,
        };
        assert_eq!(err.to_string(), "Invalid key length: expected 32, got 16");
    }

    #[test]
    fn test_kdf_error() {
        let err = CryptoError::kdf("test failure");
        assert!(matches!(err, CryptoError::KdfError(_)));
    }

    #[test]
    fn test_verification_failed() {
        let err = CryptoError::VerificationFailed;
        assert_eq!(
            err.to_string(),
            "Verification failed: Data integrity cannot be guaranteed"
        );
    }

    #[test]
    fn test_commitment_mismatch_display() {
        let err = CryptoError::CommitmentMismatch;
        assert!(err.to_string().contains("Commitment"));
    }
}
