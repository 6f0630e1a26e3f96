//! The protocol message union.
//!
//! Every variant maps to exactly one stable string tag (enforced by the
//! `type` field of the JSON representation and the exhaustive [`Message::kind`]
//! match). Unknown tags fail deserialization with a typed error rather than
//! being silently ignored, which is what lets the dispatcher treat every
//! inbound line totally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smslock_crypto::{CipherMode, PublicIdentity};

use crate::wire;

/// All protocol messages exchanged between clients and the directory server.
///
/// # Invariants
///
/// - Tag Uniqueness: each variant corresponds to exactly one wire tag.
/// - Round-trip: serializing and reparsing a message yields an equal value.
/// - Exactly one of [`Message::PlainContent`] / [`Message::EncryptedContent`]
///   describes an application message; confidentiality is chosen at
///   construction, not toggled later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Client announces intent to join. No payload; the one-time password
    /// travels out-of-band to the operator.
    JoinRequest,

    /// Client identity registration, sent sealed under the bootstrap
    /// strategy.
    #[serde(rename = "join_request_client_info")]
    ClientInformation {
        /// Phone number the client claims
        phone: String,
        /// Public identity to register under that number
        public_key: PublicIdentity,
        /// Fresh nonce the server must echo back
        nonce: String,
    },

    /// Server acknowledgment of a registration, echoing the client's nonce.
    JoinConfirmation {
        /// The nonce from the `ClientInformation` being confirmed
        nonce: String,
    },

    /// Ask for the full phone number → public key directory.
    ClientListRequest,

    /// Directory snapshot.
    ClientList {
        /// Registered clients, keyed by exact phone number string
        clients: BTreeMap<String, PublicIdentity>,
    },

    /// Resolve one phone number to its public key.
    ClientRequest {
        /// Phone number to resolve
        phone: String,
    },

    /// Resolution result.
    ClientPublicKey {
        /// Phone number the key belongs to, when the server includes it
        #[serde(skip_serializing_if = "Option::is_none", default)]
        phone: Option<String>,
        /// The resolved public identity
        public_key: PublicIdentity,
    },

    /// Server refusal of an unrecognized or invalid request.
    ProtocolInvalidation {
        /// Human-readable refusal reason
        reason: String,
    },

    /// Peer message content in the clear.
    PlainContent {
        /// The content text
        text: String,
    },

    /// Peer message content under the channel's encryption strategy.
    EncryptedContent {
        /// Nonce-prefixed ciphertext of the content text
        #[serde(with = "wire::b64")]
        ciphertext: Vec<u8>,
    },

    /// Fresh symmetric key for the remainder of a conversation. Only valid
    /// when it arrives sealed under the asymmetric strategy.
    SessionKey {
        /// Raw 32-byte session key
        #[serde(with = "wire::b64")]
        session_key: Vec<u8>,
        /// Fresh nonce binding the key to this exchange
        nonce: String,
    },

    /// A whole envelope encrypted under the recorded strategy variant.
    Sealed {
        /// Which strategy variant was applied, so the receiver selects the
        /// matching inverse without external hinting
        mode: CipherMode,
        /// Nonce-prefixed ciphertext of the inner envelope line
        #[serde(with = "wire::b64")]
        ciphertext: Vec<u8>,
    },
}

impl Message {
    /// Stable wire identifier for this message type.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::JoinRequest => "join_request",
            Self::ClientInformation { .. } => "join_request_client_info",
            Self::JoinConfirmation { .. } => "join_confirmation",
            Self::ClientListRequest => "client_list_request",
            Self::ClientList { .. } => "client_list",
            Self::ClientRequest { .. } => "client_request",
            Self::ClientPublicKey { .. } => "client_public_key",
            Self::ProtocolInvalidation { .. } => "protocol_invalidation",
            Self::PlainContent { .. } => "plain_content",
            Self::EncryptedContent { .. } => "encrypted_content",
            Self::SessionKey { .. } => "session_key",
            Self::Sealed { .. } => "sealed",
        }
    }
}
