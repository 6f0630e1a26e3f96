//! Wire messages and envelope for the smslock protocol.
//!
//! The wire is one JSON object per line over a message-oriented text carrier
//! (SMS in the original deployment). Frame plumbing stays out of this crate:
//! it assumes a reliable line-delimited channel and defines only what the
//! lines contain.
//!
//! - [`Message`] is the tagged union of every protocol message, with stable
//!   string type identifiers.
//! - [`Envelope`] pairs a message with its optional authentication tag and
//!   implements sealing: encrypting a whole envelope under an
//!   [`EncryptionStrategy`](smslock_crypto::EncryptionStrategy) while
//!   recording which strategy variant was applied.

pub mod envelope;
pub mod errors;
pub mod message;
pub mod wire;

pub use envelope::Envelope;
pub use errors::{ProtocolError, Result};
pub use message::Message;
