//! Envelope: one message plus its optional authentication tag.
//!
//! The envelope is the unit that crosses the wire and the unit that gets
//! sealed. Its canonical form (the signing input) is the JSON serialization
//! of the message alone, so the authentication tag rides beside the content
//! it covers and signing never rewrites the content itself.
//!
//! Sealing serializes the whole envelope (tag included), encrypts it under a
//! strategy, and wraps the ciphertext in [`Message::Sealed`] together with
//! the strategy's mode marker. An authenticated message therefore stays
//! authenticated through any number of sealing layers.

use serde::{Deserialize, Serialize};
use smslock_crypto::{EncryptionStrategy, MessageAuthenticator, PublicIdentity, SigningKey};

use crate::{
    errors::{ProtocolError, Result},
    message::Message,
    wire,
};

/// One wire line: a message and its optional authentication tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The protocol message.
    #[serde(flatten)]
    pub message: Message,

    /// Ed25519 tag over the canonical form, when the sender authenticated.
    ///
    /// Set after construction; mutating the message afterwards invalidates
    /// the tag (it is never recomputed implicitly).
    #[serde(skip_serializing_if = "Option::is_none", default, with = "wire::b64_opt")]
    pub authentication: Option<Vec<u8>>,
}

impl Envelope {
    /// Wrap a message with no authentication tag.
    pub fn new(message: Message) -> Self {
        Self { message, authentication: None }
    }

    /// Canonical bytes: the message serialization, authentication excluded.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.message).map_err(|err| ProtocolError::Serialize(err.to_string()))
    }

    /// Serialize to one wire line (no trailing newline).
    pub fn to_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| ProtocolError::Serialize(err.to_string()))
    }

    /// Parse one wire line.
    pub fn from_line(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).map_err(|err| ProtocolError::Malformed(err.to_string()))
    }

    /// Sign in place, filling the authentication slot with a tag over the
    /// canonical form.
    pub fn sign(
        &mut self,
        authenticator: &MessageAuthenticator,
        signer: &SigningKey,
    ) -> Result<()> {
        let canonical = self.canonical_bytes()?;
        self.authentication = Some(authenticator.sign(&canonical, signer));
        Ok(())
    }

    /// Check the authentication tag against a claimed signer identity.
    ///
    /// Fails closed: an unsigned envelope, a malformed tag, or a mismatched
    /// signature all report `false`.
    pub fn is_authentic(
        &self,
        authenticator: &MessageAuthenticator,
        claimed: &PublicIdentity,
    ) -> bool {
        let Ok(canonical) = self.canonical_bytes() else {
            return false;
        };
        authenticator.verify(&canonical, self.authentication.as_deref(), claimed)
    }

    /// Seal the entire envelope under `strategy`, recording its mode.
    pub fn seal(&self, strategy: &dyn EncryptionStrategy) -> Result<Self> {
        let line = self.to_line()?;
        let ciphertext = strategy.encrypt(line.as_bytes())?;
        Ok(Self::new(Message::Sealed { mode: strategy.mode(), ciphertext }))
    }

    /// Invert one sealing layer.
    ///
    /// # Errors
    ///
    /// - `NotSealed` if the message is not a sealing wrapper
    /// - `ModeMismatch` if the strategy's mode differs from the recorded
    ///   marker (the wrong inverse was offered)
    /// - `Crypto` if decryption fails (wrong key, tampering)
    /// - `Malformed` if the decrypted bytes are not a valid envelope line
    pub fn unseal(&self, strategy: &dyn EncryptionStrategy) -> Result<Self> {
        match &self.message {
            Message::Sealed { mode, ciphertext } => {
                if *mode != strategy.mode() {
                    return Err(ProtocolError::ModeMismatch {
                        recorded: *mode,
                        offered: strategy.mode(),
                    });
                }
                let plain = strategy.decrypt(ciphertext)?;
                let line = String::from_utf8(plain)
                    .map_err(|err| ProtocolError::Malformed(err.to_string()))?;
                Self::from_line(&line)
            },
            other => Err(ProtocolError::NotSealed { kind: other.kind() }),
        }
    }
}
