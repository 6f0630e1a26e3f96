//! Client identity keys and the key storage boundary.
//!
//! A client identity is an Ed25519 signing key (authentication tags) plus an
//! X25519 static secret (channel key agreement). [`PublicIdentity`] is the
//! public half of both, and is the only part that ever serializes: the wire
//! form is two base64 strings, matching the text carrier.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::StaticSecret;

use crate::error::CryptoError;

/// Public half of a client identity.
///
/// Registered in the directory under the client's phone number and handed to
/// peers on resolution. Carries the Ed25519 verifying key and the X25519
/// public key as raw 32-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicIdentity {
    signing: [u8; 32],
    exchange: [u8; 32],
}

impl PublicIdentity {
    /// Assemble an identity from its raw public key bytes.
    pub fn from_parts(signing: [u8; 32], exchange: [u8; 32]) -> Self {
        Self { signing, exchange }
    }

    /// Raw Ed25519 verifying key bytes.
    pub fn signing_bytes(&self) -> &[u8; 32] {
        &self.signing
    }

    /// Raw X25519 public key bytes.
    pub fn exchange_bytes(&self) -> &[u8; 32] {
        &self.exchange
    }

    /// Parse the signing half into a usable verifying key.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the bytes are not a valid Ed25519 point. Wire input
    ///   is untrusted, so this is checked at use time rather than assumed.
    pub fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_bytes(&self.signing)
            .map_err(|err| CryptoError::InvalidKey(err.to_string()))
    }
}

/// Wire form: base64 strings for both halves.
#[derive(Serialize, Deserialize)]
struct PublicIdentityWire {
    signing: String,
    exchange: String,
}

impl Serialize for PublicIdentity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = PublicIdentityWire {
            signing: STANDARD.encode(self.signing),
            exchange: STANDARD.encode(self.exchange),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicIdentity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PublicIdentityWire::deserialize(deserializer)?;
        Ok(Self { signing: decode_key(&wire.signing)?, exchange: decode_key(&wire.exchange)? })
    }
}

fn decode_key<E: serde::de::Error>(encoded: &str) -> Result<[u8; 32], E> {
    let bytes = STANDARD.decode(encoded).map_err(E::custom)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| E::custom(format!("key must be 32 bytes, got {len}")))
}

/// Private key material for one client.
///
/// Owns the Ed25519 signing key and the X25519 static secret. Private halves
/// never serialize and never transit; both zeroize on drop via their dalek
/// types. No `Clone`/`Debug` to prevent accidental leakage.
pub struct ClientKeys {
    signing: SigningKey,
    exchange: StaticSecret,
}

impl ClientKeys {
    /// Generate a fresh key pair from OS entropy.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
            exchange: StaticSecret::random_from_rng(OsRng),
        }
    }

    /// The public half, suitable for registration and resolution.
    pub fn public(&self) -> PublicIdentity {
        PublicIdentity {
            signing: self.signing.verifying_key().to_bytes(),
            exchange: x25519_dalek::PublicKey::from(&self.exchange).to_bytes(),
        }
    }

    /// The Ed25519 signing key, for authentication tags.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    /// The X25519 static secret, for channel key agreement.
    pub fn exchange_secret(&self) -> &StaticSecret {
        &self.exchange
    }
}

/// Storage boundary for client key pairs.
///
/// Persistence is an external concern; the protocol only requires that a
/// join attempt can obtain a key pair. A persistent implementation returns
/// the same pair across calls, the ephemeral one below mints a fresh pair
/// per call (which is what a restarted join handshake wants).
pub trait KeyStore {
    /// Load the stored key pair, or create (and persist) a new one.
    fn load_or_create(&mut self) -> Result<ClientKeys, CryptoError>;
}

/// Key store with no persistence: every call yields a fresh pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralKeyStore;

impl EphemeralKeyStore {
    /// Create the store.
    pub fn new() -> Self {
        Self
    }
}

impl KeyStore for EphemeralKeyStore {
    fn load_or_create(&mut self) -> Result<ClientKeys, CryptoError> {
        Ok(ClientKeys::generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_identity_matches_key_pair() {
        let keys = ClientKeys::generate();
        let identity = keys.public();

        assert_eq!(identity.signing_bytes(), &keys.signing_key().verifying_key().to_bytes());
        assert!(identity.verifying_key().is_ok());
    }

    #[test]
    fn generated_pairs_are_distinct() {
        let a = ClientKeys::generate();
        let b = ClientKeys::generate();

        assert_ne!(a.public(), b.public());
    }

    #[test]
    fn ephemeral_store_mints_fresh_pairs() {
        let mut store = EphemeralKeyStore::new();

        let first = store.load_or_create().unwrap().public();
        let second = store.load_or_create().unwrap().public();

        assert_ne!(first, second);
    }

    #[test]
    fn identity_wire_round_trip() {
        let identity = ClientKeys::generate().public();

        let json = serde_json::to_string(&identity).unwrap();
        let decoded: PublicIdentity = serde_json::from_str(&json).unwrap();

        assert_eq!(identity, decoded);
    }

    #[test]
    fn identity_rejects_short_key() {
        let json = format!(
            r#"{{"signing":"{}","exchange":"{}"}}"#,
            STANDARD.encode([0u8; 16]),
            STANDARD.encode([0u8; 32]),
        );

        assert!(serde_json::from_str::<PublicIdentity>(&json).is_err());
    }

    #[test]
    fn identity_rejects_invalid_base64() {
        let json = format!(
            r#"{{"signing":"not base64!","exchange":"{}"}}"#,
            STANDARD.encode([0u8; 32]),
        );

        assert!(serde_json::from_str::<PublicIdentity>(&json).is_err());
    }
}
