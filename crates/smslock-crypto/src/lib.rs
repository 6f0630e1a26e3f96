//! Smslock Cryptographic Primitives
//!
//! Cryptographic building blocks for the smslock protocol: client identity
//! keys, the two message encryption strategies, and the message
//! authenticator.
//!
//! # Key Lifecycle
//!
//! A client owns one long-lived identity: an Ed25519 signing key for
//! authentication tags and an X25519 static secret for key agreement. Only
//! the public halves ([`PublicIdentity`]) ever leave the process; they are
//! what the directory server registers and hands out to peers.
//!
//! ```text
//! One-time password ──HKDF──▶ bootstrap key ──▶ SymmetricStrategy (join only)
//!
//! own X25519 secret ─┐
//!                    ├─DH──HKDF──▶ channel key ──▶ AsymmetricStrategy
//! peer X25519 public ┘
//! ```
//!
//! # Security
//!
//! - The bootstrap key exists only for the duration of one join handshake
//!   and is derived with a dedicated label, so it can never collide with a
//!   channel key.
//! - Both strategies use XChaCha20-Poly1305 with a random 24-byte nonce per
//!   message; failed authentication tags reject the message rather than
//!   yielding garbage.
//! - Strategy keys are zeroized on drop.
//! - Verification fails closed: a missing, malformed, or mismatched tag is
//!   reported as not authentic, never as an error the caller might ignore.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod authenticator;
pub mod derivation;
pub mod error;
pub mod keys;
pub mod strategy;

pub use authenticator::{MessageAuthenticator, SIGNATURE_SIZE};
pub use ed25519_dalek::SigningKey;
pub use derivation::{derive_bootstrap_key, derive_channel_key};
pub use error::CryptoError;
pub use keys::{ClientKeys, EphemeralKeyStore, KeyStore, PublicIdentity};
pub use strategy::{
    AsymmetricStrategy, CipherMode, EncryptionStrategy, NONCE_SIZE, SESSION_KEY_SIZE,
    SymmetricStrategy,
};
