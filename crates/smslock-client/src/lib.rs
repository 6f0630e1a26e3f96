//! smslock client.
//!
//! The client side of the smslock protocol: the join handshake that turns an
//! out-of-band one-time password into a directory registration
//! ([`ServerSession`]), the discovery queries that resolve phone numbers to
//! public identities, and the [`PeerChannel`] that exchanges confidential
//! and/or authenticated messages with one resolved partner.
//!
//! Everything here is synchronous and blocking: one session is one logical
//! thread of control, and the carrier ([`Transport`]) is an external
//! collaborator that may block on send and receive. Timeouts and retries are
//! a caller concern.

pub mod channel;
pub mod error;
pub mod session;
pub mod transport;

pub use channel::{PeerChannel, Received};
pub use error::ClientError;
pub use session::{JoinState, ServerSession};
pub use transport::{InMemoryTransport, TcpLineTransport, Transport, TransportError};
