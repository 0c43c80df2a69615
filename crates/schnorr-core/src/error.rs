//! Error types for Schnorr signing and aggregation

use thiserror::Error;

/// Result type alias for Schnorr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while signing, aggregating or verifying
#[derive(Debug, Error)]
pub enum Error {
    /// Key aggregation or multi-signing with fewer than two keys
    #[error("At least 2 public keys should be provided")]
    InsufficientParticipants,

    /// Multi-signing attempted without a stored nonce pair for the session
    #[error("Nonces should be exchanged before signing")]
    NoncesNotExchanged,

    /// Public nonces requested for a session that has none
    #[error("Nonces not set")]
    NoncesNotSet,

    /// The signer's own effective nonce is missing from the peer nonce set
    #[error("Passed nonces are invalid")]
    InvalidNonceSet,

    /// Summation called with fewer than two partial signatures
    #[error("At least 2 signatures should be provided")]
    InsufficientSignatures,

    /// Malformed hex, wrong length, or bytes that are not a valid point/scalar
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Persisted state failed to parse or has the wrong shape
    #[error("Invalid JSON: {0}")]
    InvalidSerialization(String),

    /// The random number generator failed
    #[error("Entropy source failure: {0}")]
    Entropy(String),

    /// A relay session was joined with a key outside its participant set
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// Network/relay error
    #[error("Relay error: {0}")]
    Relay(String),

    /// An aggregate signature did not verify
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidSerialization(e.to_string())
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::InvalidEncoding(e.to_string())
    }
}

impl From<rand_core::Error> for Error {
    fn from(e: rand_core::Error) -> Self {
        Error::Entropy(e.to_string())
    }
}
