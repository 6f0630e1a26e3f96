//! Client error taxonomy.

use smslock_crypto::CryptoError;
use smslock_proto::ProtocolError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by the client protocol layer.
///
/// None of these are retried internally; a join failure means the handshake
/// restarts from scratch, and channel failures leave no partial state.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Malformed constructor arguments (empty phone number, empty nonce).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The reply had an unexpected type, or a handshake nonce did not match.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// The directory has no entry for the requested phone number.
    #[error("no client registered for phone number {phone}")]
    ClientNotFound {
        /// The phone number that missed
        phone: String,
    },

    /// Encryption or decryption failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Wire encoding, decoding, sealing, or unsealing failure.
    #[error(transparent)]
    Wire(#[from] ProtocolError),

    /// Carrier failure, surfaced without retry.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
