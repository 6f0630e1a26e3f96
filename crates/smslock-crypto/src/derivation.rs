//! Key derivation for bootstrap and channel keys using HKDF.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::StaticSecret;

/// Label for deriving the bootstrap key from a one-time password.
const BOOTSTRAP_LABEL: &[u8] = b"smslockBootstrapV1";

/// Label for deriving a channel key from an X25519 agreement.
const CHANNEL_LABEL: &[u8] = b"smslockChannelV1";

/// Derive the bootstrap cipher key from an out-of-band one-time password.
///
/// Both the joining client and the server run this over the same password,
/// so both ends of the join handshake arrive at the same 32-byte key.
///
/// # Security
///
/// - Deterministic: same password always produces the same key
/// - The label separates this derivation from channel keys, so a password
///   that happened to equal a shared secret still yields an unrelated key
pub fn derive_bootstrap_key(one_time_password: &str) -> [u8; 32] {
    expand(one_time_password.as_bytes(), BOOTSTRAP_LABEL)
}

/// Derive a channel cipher key from an X25519 agreement with a peer.
///
/// Diffie-Hellman is symmetric in its arguments, so
/// `derive_channel_key(a_secret, b_public)` and
/// `derive_channel_key(b_secret, a_public)` produce the same key. That is
/// what lets either introduced party decrypt what the other encrypted.
pub fn derive_channel_key(own: &StaticSecret, peer_exchange: &[u8; 32]) -> [u8; 32] {
    let shared = own.diffie_hellman(&x25519_dalek::PublicKey::from(*peer_exchange));
    expand(shared.as_bytes(), CHANNEL_LABEL)
}

fn expand(input_key_material: &[u8], label: &[u8]) -> [u8; 32] {
    let hkdf = Hkdf::<Sha256>::new(None, input_key_material);

    let mut key = [0u8; 32];
    let Ok(()) = hkdf.expand(label, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::ClientKeys;

    #[test]
    fn bootstrap_key_is_deterministic() {
        assert_eq!(derive_bootstrap_key("otp-123456"), derive_bootstrap_key("otp-123456"));
    }

    #[test]
    fn different_passwords_produce_different_keys() {
        assert_ne!(derive_bootstrap_key("otp-123456"), derive_bootstrap_key("otp-654321"));
    }

    #[test]
    fn channel_key_agrees_in_both_directions() {
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();

        let from_alice =
            derive_channel_key(alice.exchange_secret(), bob.public().exchange_bytes());
        let from_bob = derive_channel_key(bob.exchange_secret(), alice.public().exchange_bytes());

        assert_eq!(from_alice, from_bob);
    }

    #[test]
    fn channel_keys_are_pair_specific() {
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();
        let eve = ClientKeys::generate();

        let alice_bob = derive_channel_key(alice.exchange_secret(), bob.public().exchange_bytes());
        let alice_eve = derive_channel_key(alice.exchange_secret(), eve.public().exchange_bytes());

        assert_ne!(alice_bob, alice_eve);
    }

    #[test]
    fn bootstrap_and_channel_labels_are_separated() {
        // Same input key material under the two labels must not collide.
        let material = [0x42u8; 32];
        let bootstrap = expand(&material, BOOTSTRAP_LABEL);
        let channel = expand(&material, CHANNEL_LABEL);

        assert_ne!(bootstrap, channel);
    }
}
