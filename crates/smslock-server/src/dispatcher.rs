//! Request dispatch with an explicit invalid-request fallback.
//!
//! Each handler is a total function over envelopes: it answers its own
//! request type and converts everything else into a
//! [`Message::ProtocolInvalidation`] response. The dispatcher routes by
//! message tag with exhaustive matching and normalizes malformed lines the
//! same way, so no inbound bytes can crash the server.
//!
//! Side effects (directory mutation) happen only on the join path.

use std::sync::Arc;

use smslock_crypto::{CipherMode, SymmetricStrategy};
use smslock_proto::{Envelope, Message};

use crate::{
    directory::{DirectoryError, KeyDirectory},
    otp::OtpProvider,
};

fn invalidation(reason: impl Into<String>) -> Envelope {
    Envelope::new(Message::ProtocolInvalidation { reason: reason.into() })
}

/// Answers [`Message::ClientListRequest`] with a directory snapshot.
pub struct ClientListHandler {
    directory: KeyDirectory,
}

impl ClientListHandler {
    /// Create the handler over a shared directory.
    pub fn new(directory: KeyDirectory) -> Self {
        Self { directory }
    }

    /// Total: a list request yields the snapshot, anything else a refusal.
    pub fn handle(&self, _sender: &str, envelope: &Envelope) -> Envelope {
        match &envelope.message {
            Message::ClientListRequest => {
                Envelope::new(Message::ClientList { clients: self.directory.snapshot() })
            },
            other => {
                invalidation(format!("unrecognized request type {} for client list", other.kind()))
            },
        }
    }
}

/// Answers [`Message::ClientRequest`] with the resolved public key.
pub struct ClientResolveHandler {
    directory: KeyDirectory,
}

impl ClientResolveHandler {
    /// Create the handler over a shared directory.
    pub fn new(directory: KeyDirectory) -> Self {
        Self { directory }
    }

    /// Total: resolution hits yield the key, misses and foreign requests a
    /// refusal.
    pub fn handle(&self, _sender: &str, envelope: &Envelope) -> Envelope {
        match &envelope.message {
            Message::ClientRequest { phone } => match self.directory.resolve(phone) {
                Ok(public_key) => Envelope::new(Message::ClientPublicKey {
                    phone: Some(phone.clone()),
                    public_key,
                }),
                Err(err) => invalidation(err.to_string()),
            },
            other => invalidation(format!(
                "unrecognized request type {} for client resolution",
                other.kind()
            )),
        }
    }
}

/// Runs the server half of the join bootstrap.
pub struct JoinHandler {
    directory: KeyDirectory,
    otp: Arc<dyn OtpProvider>,
}

impl JoinHandler {
    /// Create the handler over a shared directory and password source.
    pub fn new(directory: KeyDirectory, otp: Arc<dyn OtpProvider>) -> Self {
        Self { directory, otp }
    }

    /// Total over envelopes. A bare join request produces no wire response
    /// (the password round is out-of-band); a symmetric-sealed envelope is
    /// the registration continuation; everything else is refused.
    pub fn handle(&self, sender: &str, envelope: &Envelope) -> Option<Envelope> {
        match &envelope.message {
            Message::JoinRequest => {
                tracing::info!(sender, "join announced, awaiting out-of-band password round");
                None
            },
            Message::Sealed { mode: CipherMode::Symmetric, .. } => {
                Some(self.continue_join(sender, envelope))
            },
            other => Some(invalidation(format!(
                "unrecognized request type {} for join",
                other.kind()
            ))),
        }
    }

    /// Unseal the registration, validate it, register, and confirm.
    fn continue_join(&self, sender: &str, envelope: &Envelope) -> Envelope {
        let Some(password) = self.otp.bootstrap_password(sender) else {
            tracing::warn!(sender, "sealed join information without an issued password");
            return invalidation("no bootstrap password issued for sender");
        };
        let strategy = SymmetricStrategy::from_password(&password);

        let inner = match envelope.unseal(&strategy) {
            Ok(inner) => inner,
            Err(err) => {
                tracing::warn!(sender, error = %err, "join information failed to unseal");
                return invalidation(format!("could not unseal join information: {err}"));
            },
        };

        let Message::ClientInformation { phone, public_key, nonce } = inner.message else {
            return invalidation(format!(
                "expected join client information, got {}",
                inner.message.kind()
            ));
        };

        if !is_well_formed_phone(&phone) {
            return invalidation(format!("malformed phone number {phone:?}"));
        }
        if nonce.is_empty() {
            return invalidation("empty nonce in join information");
        }

        match self.directory.register(&phone, public_key) {
            Ok(()) => {
                tracing::info!(sender, %phone, "client registered");
                let confirmation = Envelope::new(Message::JoinConfirmation { nonce });
                match confirmation.seal(&strategy) {
                    Ok(sealed) => sealed,
                    Err(err) => invalidation(format!("could not seal confirmation: {err}")),
                }
            },
            Err(err @ DirectoryError::DuplicateEntry { .. }) => {
                tracing::warn!(sender, %phone, "join refused: duplicate registration");
                invalidation(err.to_string())
            },
            Err(err) => invalidation(err.to_string()),
        }
    }
}

/// A phone number is an optional `+` followed by at least one ASCII digit.
fn is_well_formed_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Routes inbound envelopes to the matching handler.
pub struct RequestDispatcher {
    join: JoinHandler,
    list: ClientListHandler,
    resolve: ClientResolveHandler,
}

impl RequestDispatcher {
    /// Create a dispatcher over a shared directory and password source.
    pub fn new(directory: KeyDirectory, otp: Arc<dyn OtpProvider>) -> Self {
        Self {
            join: JoinHandler::new(directory.clone(), otp),
            list: ClientListHandler::new(directory.clone()),
            resolve: ClientResolveHandler::new(directory),
        }
    }

    /// Route one envelope. `None` means no wire response (join
    /// announcement); every other input gets exactly one response.
    pub fn handle(&self, sender: &str, envelope: &Envelope) -> Option<Envelope> {
        tracing::debug!(sender, kind = envelope.message.kind(), "dispatching request");
        match &envelope.message {
            Message::JoinRequest | Message::Sealed { .. } => self.join.handle(sender, envelope),
            Message::ClientListRequest => Some(self.list.handle(sender, envelope)),
            Message::ClientRequest { .. } => Some(self.resolve.handle(sender, envelope)),
            other => {
                tracing::warn!(sender, kind = other.kind(), "unrecognized request");
                Some(invalidation(format!("unrecognized request type {}", other.kind())))
            },
        }
    }

    /// Wire-facing form: parses the line, dispatches, serializes the
    /// response. Malformed lines become invalidation responses, keeping the
    /// server total against adversarial input.
    pub fn handle_line(&self, sender: &str, line: &str) -> Option<String> {
        let envelope = match Envelope::from_line(line) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(sender, error = %err, "malformed inbound line");
                return invalidation(format!("malformed message: {err}")).to_line().ok();
            },
        };
        let response = self.handle(sender, &envelope)?;
        match response.to_line() {
            Ok(line) => Some(line),
            Err(err) => {
                tracing::error!(sender, error = %err, "response failed to serialize");
                invalidation("internal serialization failure").to_line().ok()
            },
        }
    }
}
