//! Error types for the smslock wire protocol.

use smslock_crypto::{CipherMode, CryptoError};
use thiserror::Error;

/// Result alias for wire operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding, decoding, sealing, or unsealing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Inbound line was not a valid protocol envelope.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Envelope could not be serialized.
    #[error("could not serialize message: {0}")]
    Serialize(String),

    /// Sealing or unsealing failed in the cipher layer.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Unsealing was offered the wrong strategy variant for the recorded
    /// marker.
    #[error("sealing mode mismatch: message records {recorded:?}, strategy is {offered:?}")]
    ModeMismatch {
        /// Mode recorded on the sealed message
        recorded: CipherMode,
        /// Mode of the strategy offered for unsealing
        offered: CipherMode,
    },

    /// Unsealing was called on a message that is not sealed.
    #[error("message is not sealed (type {kind})")]
    NotSealed {
        /// Type identifier of the non-sealed message
        kind: &'static str,
    },
}
