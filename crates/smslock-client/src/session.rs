//! Directory server session: join handshake and discovery queries.
//!
//! The join handshake is a two-round protocol. The client announces intent,
//! the operator obtains a one-time password out-of-band, and the client then
//! sends its identity sealed under a key derived from that password. The
//! server's confirmation must echo the client's nonce exactly; anything else
//! aborts the handshake. A failed attempt is not resumable: the next attempt
//! starts over with a fresh transient [`JoinSession`].

use std::collections::BTreeMap;

use rand::{Rng, distributions::Alphanumeric};
use smslock_crypto::{ClientKeys, KeyStore, PublicIdentity, SymmetricStrategy};
use smslock_proto::{Envelope, Message};

use crate::{error::ClientError, transport::Transport};

/// Length of handshake nonces (alphanumeric alphabet).
pub(crate) const NONCE_LENGTH: usize = 10;

/// Carrier destination addressing the directory server.
const DIRECTORY_ADDRESS: &str = "directory";

/// Draw a fresh alphanumeric handshake nonce.
pub(crate) fn random_nonce() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(NONCE_LENGTH).map(char::from).collect()
}

/// Join handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    /// No handshake in flight.
    Start,
    /// Join announced; waiting on the out-of-band password round.
    AwaitingOtpConfirmation,
    /// Identity sent; waiting on the server's confirmation.
    AwaitingJoinConfirmation,
    /// Registered with the directory.
    Joined,
}

/// Transient state for one join attempt.
///
/// Exists only for the duration of a single handshake run and is discarded
/// on success or failure; a restarted attempt builds a new one, which
/// re-queries the key store and draws a fresh nonce.
struct JoinSession {
    keys: ClientKeys,
    strategy: SymmetricStrategy,
    nonce: String,
}

impl JoinSession {
    fn begin(store: &mut dyn KeyStore, one_time_password: &str) -> Result<Self, ClientError> {
        Ok(Self {
            keys: store.load_or_create()?,
            strategy: SymmetricStrategy::from_password(one_time_password),
            nonce: random_nonce(),
        })
    }
}

/// One client's session with the directory server.
pub struct ServerSession<T: Transport> {
    phone: String,
    transport: T,
    keys: Option<ClientKeys>,
    state: JoinState,
}

impl<T: Transport> ServerSession<T> {
    /// Create a session for `phone` over `transport`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the phone number is empty
    pub fn new(phone: impl Into<String>, transport: T) -> Result<Self, ClientError> {
        let phone = phone.into();
        if phone.is_empty() {
            return Err(ClientError::Validation("phone number is empty".to_string()));
        }
        Ok(Self { phone, transport, keys: None, state: JoinState::Start })
    }

    /// Resume a session whose keys were registered previously.
    pub fn resume(
        phone: impl Into<String>,
        keys: ClientKeys,
        transport: T,
    ) -> Result<Self, ClientError> {
        let mut session = Self::new(phone, transport)?;
        session.keys = Some(keys);
        session.state = JoinState::Joined;
        Ok(session)
    }

    /// The phone number this session claims.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Current join handshake progress.
    pub fn join_state(&self) -> JoinState {
        self.state
    }

    /// Own key pair, once joined (or resumed).
    pub fn keys(&self) -> Option<&ClientKeys> {
        self.keys.as_ref()
    }

    /// Run the join handshake with the out-of-band one-time password.
    ///
    /// On success the session holds the registered keys and reports
    /// [`JoinState::Joined`]. On any failure (refusal, unsealing error,
    /// wrong reply type, nonce mismatch) the state falls back to
    /// [`JoinState::Start`] and the attempt's keys and nonce are discarded.
    pub fn request_join(
        &mut self,
        store: &mut dyn KeyStore,
        one_time_password: &str,
    ) -> Result<(), ClientError> {
        self.state = JoinState::Start;
        let join = JoinSession::begin(store, one_time_password)?;

        self.send(&Envelope::new(Message::JoinRequest))?;
        self.state = JoinState::AwaitingOtpConfirmation;

        let info = Envelope::new(Message::ClientInformation {
            phone: self.phone.clone(),
            public_key: join.keys.public(),
            nonce: join.nonce.clone(),
        });
        self.send(&info.seal(&join.strategy)?)?;
        self.state = JoinState::AwaitingJoinConfirmation;

        let reply = match self.receive() {
            Ok(reply) => reply,
            Err(err) => return Err(self.abort(err)),
        };

        let confirmation = match &reply.message {
            Message::Sealed { .. } => match reply.unseal(&join.strategy) {
                Ok(inner) => inner,
                Err(err) => return Err(self.abort(err.into())),
            },
            Message::ProtocolInvalidation { reason } => {
                return Err(self.abort(ClientError::ProtocolMismatch(format!(
                    "server refused join: {reason}"
                ))));
            },
            other => {
                return Err(self.abort(ClientError::ProtocolMismatch(format!(
                    "expected sealed join confirmation, got {}",
                    other.kind()
                ))));
            },
        };

        match confirmation.message {
            Message::JoinConfirmation { nonce } if nonce == join.nonce => {
                self.keys = Some(join.keys);
                self.state = JoinState::Joined;
                tracing::info!(phone = %self.phone, "joined directory");
                Ok(())
            },
            Message::JoinConfirmation { .. } => Err(self.abort(ClientError::ProtocolMismatch(
                "join confirmation nonce does not match".to_string(),
            ))),
            other => Err(self.abort(ClientError::ProtocolMismatch(format!(
                "expected join confirmation, got {}",
                other.kind()
            )))),
        }
    }

    /// Fetch the full phone number → public identity directory.
    pub fn request_list(&mut self) -> Result<BTreeMap<String, PublicIdentity>, ClientError> {
        self.send(&Envelope::new(Message::ClientListRequest))?;
        let reply = self.receive()?;
        match reply.message {
            Message::ClientList { clients } => Ok(clients),
            Message::ProtocolInvalidation { reason } => Err(ClientError::ProtocolMismatch(
                format!("server refused list request: {reason}"),
            )),
            other => Err(ClientError::ProtocolMismatch(format!(
                "expected client list, got {}",
                other.kind()
            ))),
        }
    }

    /// Resolve `phone` to its registered public identity.
    ///
    /// # Errors
    ///
    /// - `ClientNotFound` when the server refuses the resolution
    pub fn request_client(&mut self, phone: &str) -> Result<PublicIdentity, ClientError> {
        if phone.is_empty() {
            return Err(ClientError::Validation("phone number is empty".to_string()));
        }
        self.send(&Envelope::new(Message::ClientRequest { phone: phone.to_string() }))?;
        let reply = self.receive()?;
        match reply.message {
            Message::ClientPublicKey { public_key, .. } => Ok(public_key),
            Message::ProtocolInvalidation { .. } => {
                Err(ClientError::ClientNotFound { phone: phone.to_string() })
            },
            other => Err(ClientError::ProtocolMismatch(format!(
                "expected client public key, got {}",
                other.kind()
            ))),
        }
    }

    fn abort(&mut self, err: ClientError) -> ClientError {
        self.state = JoinState::Start;
        err
    }

    fn send(&mut self, envelope: &Envelope) -> Result<(), ClientError> {
        let line = envelope.to_line()?;
        tracing::debug!(kind = envelope.message.kind(), "sending to directory");
        self.transport.send(DIRECTORY_ADDRESS, &line)?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Envelope, ClientError> {
        let line = self.transport.receive()?;
        Ok(Envelope::from_line(&line)?)
    }
}
