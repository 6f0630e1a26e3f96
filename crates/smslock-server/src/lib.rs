//! smslock directory server.
//!
//! Holds the phone number → public identity registry and answers directory
//! requests: join bootstrap, full listing, and single-number resolution.
//! The protocol logic is transport-agnostic (the dispatcher consumes lines);
//! [`serve`] wraps it in a line-delimited TCP loop for the binary.

pub mod directory;
pub mod dispatcher;
pub mod otp;
pub mod transport;

pub use directory::{DirectoryError, KeyDirectory};
pub use dispatcher::{ClientListHandler, ClientResolveHandler, JoinHandler, RequestDispatcher};
pub use otp::{FixedOtpProvider, OtpProvider, TableOtpProvider};
pub use transport::serve;
