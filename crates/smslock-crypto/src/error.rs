//! Error types for smslock cryptography.

use thiserror::Error;

/// Errors from key handling, encryption, and decryption.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Decryption failed: wrong key, wrong strategy variant, or tampered
    /// ciphertext. Deliberately carries no distinction between those causes.
    #[error("decryption failed: {reason}")]
    CryptFailure {
        /// What the cipher layer observed
        reason: String,
    },

    /// Key material had the wrong length or an invalid encoding.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}
