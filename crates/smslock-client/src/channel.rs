//! Peer channel: confidential and authenticated messaging with one partner.
//!
//! One channel serves one logical conversation with one resolved partner.
//! Confidentiality and authentication are independent flags on every send;
//! all four combinations are valid. Content encryption uses the asymmetric
//! strategy bound at open time, unless a session key upgrade has installed a
//! symmetric session strategy.

use rand::{RngCore, rngs::OsRng};
use smslock_crypto::{
    AsymmetricStrategy, CipherMode, ClientKeys, CryptoError, EncryptionStrategy,
    MessageAuthenticator, PublicIdentity, SESSION_KEY_SIZE, SigningKey, SymmetricStrategy,
};
use smslock_proto::{Envelope, Message};

use crate::{
    error::ClientError,
    session::{ServerSession, random_nonce},
    transport::Transport,
};

/// One inbound item on a peer channel.
#[derive(Debug)]
pub enum Received {
    /// Application content, with its envelope kept for authenticity checks.
    Content {
        /// The envelope as received
        envelope: Envelope,
        /// The recovered plaintext
        text: String,
    },

    /// The partner installed a new session key; carries no content.
    SessionEstablished,
}

/// Client-side channel to one resolved partner.
pub struct PeerChannel<T: Transport> {
    partner_phone: String,
    partner_identity: PublicIdentity,
    signing: SigningKey,
    asymmetric: AsymmetricStrategy,
    session: Option<SymmetricStrategy>,
    authenticator: MessageAuthenticator,
    transport: T,
}

impl<T: Transport> PeerChannel<T> {
    /// Resolve `partner_phone` through the directory session and bind the
    /// channel.
    ///
    /// # Errors
    ///
    /// - `Validation` if the partner phone is empty or the session has not
    ///   joined (no own keys)
    /// - `ClientNotFound` if the directory has no entry for the partner
    pub fn open<S: Transport>(
        partner_phone: &str,
        session: &mut ServerSession<S>,
        transport: T,
    ) -> Result<Self, ClientError> {
        let partner_identity = session.request_client(partner_phone)?;
        let keys = session.keys().ok_or_else(|| {
            ClientError::Validation("session has not joined, no own keys available".to_string())
        })?;
        Self::with_identity(partner_phone, partner_identity, keys, transport)
    }

    /// Bind a channel to an already-resolved partner identity.
    pub fn with_identity(
        partner_phone: &str,
        partner_identity: PublicIdentity,
        keys: &ClientKeys,
        transport: T,
    ) -> Result<Self, ClientError> {
        if partner_phone.is_empty() {
            return Err(ClientError::Validation("partner phone number is empty".to_string()));
        }
        Ok(Self {
            partner_phone: partner_phone.to_string(),
            partner_identity,
            signing: keys.signing_key().clone(),
            asymmetric: AsymmetricStrategy::new(keys, &partner_identity),
            session: None,
            authenticator: MessageAuthenticator::new(),
            transport,
        })
    }

    /// The partner's phone number.
    pub fn partner_phone(&self) -> &str {
        &self.partner_phone
    }

    /// The partner's resolved public identity.
    pub fn partner_identity(&self) -> &PublicIdentity {
        &self.partner_identity
    }

    /// Whether a session key upgrade is in effect.
    pub fn session_established(&self) -> bool {
        self.session.is_some()
    }

    /// Send `content`, independently confidential and/or authenticated.
    pub fn send(
        &mut self,
        content: &str,
        confidential: bool,
        authenticate: bool,
    ) -> Result<(), ClientError> {
        let message = if confidential {
            Message::EncryptedContent {
                ciphertext: self.content_strategy().encrypt(content.as_bytes())?,
            }
        } else {
            Message::PlainContent { text: content.to_string() }
        };

        let mut envelope = Envelope::new(message);
        if authenticate {
            envelope.sign(&self.authenticator, &self.signing)?;
        }

        let line = envelope.to_line()?;
        tracing::debug!(partner = %self.partner_phone, confidential, authenticate, "sending");
        self.transport.send(&self.partner_phone, &line)?;
        Ok(())
    }

    /// Block until the next inbound item and process it.
    pub fn receive(&mut self) -> Result<Received, ClientError> {
        let line = self.transport.receive()?;
        self.handle_line(&line)
    }

    /// Process one raw inbound line.
    ///
    /// Failures leave the channel unchanged: no partial state mutation.
    pub fn handle_line(&mut self, raw: &str) -> Result<Received, ClientError> {
        let envelope = Envelope::from_line(raw)?;
        match &envelope.message {
            Message::PlainContent { text } => {
                let text = text.clone();
                Ok(Received::Content { envelope, text })
            },
            Message::EncryptedContent { ciphertext } => {
                let plain = self.content_strategy().decrypt(ciphertext)?;
                let text = String::from_utf8(plain).map_err(|err| {
                    ClientError::ProtocolMismatch(format!("content is not valid UTF-8: {err}"))
                })?;
                Ok(Received::Content { envelope, text })
            },
            Message::Sealed { mode: CipherMode::Asymmetric, .. } => {
                let inner = envelope.unseal(&self.asymmetric)?;
                self.install_session_key(inner)
            },
            Message::SessionKey { .. } => Err(ClientError::ProtocolMismatch(
                "session key must arrive sealed under the channel strategy".to_string(),
            )),
            other => Err(ClientError::ProtocolMismatch(format!(
                "unexpected peer message {}",
                other.kind()
            ))),
        }
    }

    /// Whether the envelope's tag verifies against the partner identity.
    ///
    /// Fails closed on unsigned or tampered envelopes.
    pub fn is_authentic(&self, envelope: &Envelope) -> bool {
        envelope.is_authentic(&self.authenticator, &self.partner_identity)
    }

    /// Draw a fresh session key, ship it sealed to the partner, and install
    /// it locally. Subsequent confidential traffic in both directions uses
    /// the session key.
    pub fn establish_session(&mut self) -> Result<(), ClientError> {
        let mut key = [0u8; SESSION_KEY_SIZE];
        OsRng.fill_bytes(&mut key);

        let envelope = Envelope::new(Message::SessionKey {
            session_key: key.to_vec(),
            nonce: random_nonce(),
        });
        let sealed = envelope.seal(&self.asymmetric)?;
        self.transport.send(&self.partner_phone, &sealed.to_line()?)?;

        self.session = Some(SymmetricStrategy::from_session_key(key));
        tracing::debug!(partner = %self.partner_phone, "session key established");
        Ok(())
    }

    fn install_session_key(&mut self, inner: Envelope) -> Result<Received, ClientError> {
        match inner.message {
            Message::SessionKey { session_key, nonce } => {
                if nonce.is_empty() {
                    return Err(ClientError::ProtocolMismatch(
                        "empty nonce on session key".to_string(),
                    ));
                }
                let len = session_key.len();
                let key: [u8; SESSION_KEY_SIZE] = session_key.try_into().map_err(|_| {
                    ClientError::Crypto(CryptoError::InvalidKey(format!(
                        "session key must be {SESSION_KEY_SIZE} bytes, got {len}"
                    )))
                })?;
                self.session = Some(SymmetricStrategy::from_session_key(key));
                tracing::debug!(partner = %self.partner_phone, "session key installed");
                Ok(Received::SessionEstablished)
            },
            other => Err(ClientError::ProtocolMismatch(format!(
                "unexpected sealed message {}",
                other.kind()
            ))),
        }
    }

    fn content_strategy(&self) -> &dyn EncryptionStrategy {
        match &self.session {
            Some(session) => session,
            None => &self.asymmetric,
        }
    }
}

#[cfg(test)]
mod tests {
    use smslock_crypto::ClientKeys;

    use super::*;
    use crate::transport::InMemoryTransport;

    #[test]
    fn empty_partner_phone_is_rejected() {
        let keys = ClientKeys::generate();
        let partner = ClientKeys::generate().public();
        let (transport, _peer) = InMemoryTransport::pair();

        let result = PeerChannel::with_identity("", partner, &keys, transport);

        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn unsigned_envelope_is_not_authentic() {
        let keys = ClientKeys::generate();
        let partner = ClientKeys::generate().public();
        let (transport, _peer) = InMemoryTransport::pair();

        let channel = PeerChannel::with_identity("12345", partner, &keys, transport).unwrap();
        let envelope = Envelope::new(Message::PlainContent { text: "hi".to_string() });

        assert!(!channel.is_authentic(&envelope));
    }

    #[test]
    fn stray_directory_message_is_a_mismatch() {
        let keys = ClientKeys::generate();
        let partner = ClientKeys::generate().public();
        let (transport, _peer) = InMemoryTransport::pair();

        let mut channel = PeerChannel::with_identity("12345", partner, &keys, transport).unwrap();
        let line = Envelope::new(Message::ClientListRequest).to_line().unwrap();

        assert!(matches!(channel.handle_line(&line), Err(ClientError::ProtocolMismatch(_))));
    }
}
