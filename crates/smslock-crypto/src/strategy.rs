//! Encryption strategies applied to protocol messages.
//!
//! Both variants present the same capability (encrypt, decrypt, mode
//! marker); they differ only in where their key comes from. The symmetric
//! variant is bootstrap-bound (one-time password, or a raw session key); the
//! asymmetric variant is identity-bound (X25519 agreement with a resolved
//! peer).
//!
//! Ciphertext layout: 24-byte random XChaCha20 nonce prefix followed by the
//! AEAD output (which includes the 16-byte Poly1305 tag).

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    derivation::{derive_bootstrap_key, derive_channel_key},
    error::CryptoError,
    keys::{ClientKeys, PublicIdentity},
};

/// XChaCha20 nonce length prepended to every ciphertext.
pub const NONCE_SIZE: usize = 24;

/// Raw session key length accepted by [`SymmetricStrategy::from_session_key`].
pub const SESSION_KEY_SIZE: usize = 32;

/// Marker recording which strategy variant sealed a message.
///
/// Travels on the wire so the receiver selects the matching inverse without
/// external hinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherMode {
    /// Bootstrap-bound key (one-time password or session key).
    Symmetric,
    /// Identity-bound key (X25519 agreement between two introduced parties).
    Asymmetric,
}

/// Confidentiality capability shared by both strategy variants.
pub trait EncryptionStrategy {
    /// Marker the receiver uses to select the inverse strategy.
    fn mode(&self) -> CipherMode;

    /// Encrypt `plaintext`, returning nonce-prefixed ciphertext.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt nonce-prefixed ciphertext produced by [`Self::encrypt`].
    ///
    /// # Errors
    ///
    /// - `CryptFailure` on a wrong key, a truncated input, or a tampered
    ///   ciphertext (the AEAD tag catches all three)
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Bootstrap-bound strategy: key derived from a shared secret.
pub struct SymmetricStrategy {
    key: [u8; 32],
}

impl SymmetricStrategy {
    /// Build the strategy from the out-of-band one-time password.
    pub fn from_password(one_time_password: &str) -> Self {
        Self { key: derive_bootstrap_key(one_time_password) }
    }

    /// Build the strategy from a raw 32-byte session key.
    pub fn from_session_key(key: [u8; SESSION_KEY_SIZE]) -> Self {
        Self { key }
    }
}

impl Drop for SymmetricStrategy {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl EncryptionStrategy for SymmetricStrategy {
    fn mode(&self) -> CipherMode {
        CipherMode::Symmetric
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(seal(&self.key, plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        open(&self.key, ciphertext)
    }
}

/// Identity-bound strategy: key agreed with one resolved peer.
///
/// Holds only the derived channel key, not the static secret it came from.
pub struct AsymmetricStrategy {
    key: [u8; 32],
}

impl AsymmetricStrategy {
    /// Agree on a channel key between `own` keys and a peer identity.
    pub fn new(own: &ClientKeys, peer: &PublicIdentity) -> Self {
        Self { key: derive_channel_key(own.exchange_secret(), peer.exchange_bytes()) }
    }
}

impl Drop for AsymmetricStrategy {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl EncryptionStrategy for AsymmetricStrategy {
    fn mode(&self) -> CipherMode {
        CipherMode::Asymmetric
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(seal(&self.key, plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        open(&self.key, ciphertext)
    }
}

fn seal(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.into());

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    out
}

fn open(key: &[u8; 32], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < NONCE_SIZE {
        return Err(CryptoError::CryptFailure {
            reason: format!(
                "ciphertext is {} bytes, shorter than the {NONCE_SIZE}-byte nonce",
                ciphertext.len()
            ),
        });
    }

    let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.into());

    cipher.decrypt(XNonce::from_slice(nonce), body).map_err(|_| CryptoError::CryptFailure {
        reason: "authentication failed".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_round_trip() {
        let strategy = SymmetricStrategy::from_password("otp-123456");

        let ciphertext = strategy.encrypt(b"hello").unwrap();
        let plaintext = strategy.decrypt(&ciphertext).unwrap();

        assert_eq!(plaintext, b"hello");
    }

    #[test]
    fn asymmetric_round_trip_in_both_directions() {
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();

        let alice_side = AsymmetricStrategy::new(&alice, &bob.public());
        let bob_side = AsymmetricStrategy::new(&bob, &alice.public());

        let to_bob = alice_side.encrypt(b"hi bob").unwrap();
        assert_eq!(bob_side.decrypt(&to_bob).unwrap(), b"hi bob");

        let to_alice = bob_side.encrypt(b"hi alice").unwrap();
        assert_eq!(alice_side.decrypt(&to_alice).unwrap(), b"hi alice");
    }

    #[test]
    fn wrong_password_fails_decryption() {
        let sender = SymmetricStrategy::from_password("otp-123456");
        let receiver = SymmetricStrategy::from_password("otp-654321");

        let ciphertext = sender.encrypt(b"secret").unwrap();
        let result = receiver.decrypt(&ciphertext);

        assert!(matches!(result, Err(CryptoError::CryptFailure { .. })));
    }

    #[test]
    fn wrong_peer_fails_decryption() {
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();
        let eve = ClientKeys::generate();

        let alice_to_bob = AsymmetricStrategy::new(&alice, &bob.public());
        let eve_side = AsymmetricStrategy::new(&eve, &alice.public());

        let ciphertext = alice_to_bob.encrypt(b"secret").unwrap();
        assert!(eve_side.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let strategy = SymmetricStrategy::from_password("otp-123456");

        let mut ciphertext = strategy.encrypt(b"original").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;

        assert!(strategy.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let strategy = SymmetricStrategy::from_password("otp-123456");

        let result = strategy.decrypt(&[0u8; NONCE_SIZE - 1]);

        assert!(matches!(result, Err(CryptoError::CryptFailure { .. })));
    }

    #[test]
    fn cross_variant_decryption_fails() {
        // A bootstrap key and a channel key never coincide, even though both
        // variants share the same cipher.
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();

        let symmetric = SymmetricStrategy::from_password("otp-123456");
        let asymmetric = AsymmetricStrategy::new(&alice, &bob.public());

        let ciphertext = symmetric.encrypt(b"bootstrap only").unwrap();
        assert!(asymmetric.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn encryption_is_randomized() {
        let strategy = SymmetricStrategy::from_password("otp-123456");

        let first = strategy.encrypt(b"same input").unwrap();
        let second = strategy.encrypt(b"same input").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn session_key_strategy_round_trip() {
        let key = [7u8; SESSION_KEY_SIZE];
        let sender = SymmetricStrategy::from_session_key(key);
        let receiver = SymmetricStrategy::from_session_key(key);

        let ciphertext = sender.encrypt(b"session traffic").unwrap();
        assert_eq!(receiver.decrypt(&ciphertext).unwrap(), b"session traffic");
    }

    #[test]
    fn modes_identify_variants() {
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();

        assert_eq!(SymmetricStrategy::from_password("x").mode(), CipherMode::Symmetric);
        assert_eq!(AsymmetricStrategy::new(&alice, &bob.public()).mode(), CipherMode::Asymmetric);
    }
}
