//! Property-based tests for the encryption strategies and authenticator.

use proptest::prelude::*;
use smslock_crypto::{
    AsymmetricStrategy, ClientKeys, EncryptionStrategy, MessageAuthenticator, SymmetricStrategy,
};

proptest! {
    #[test]
    fn symmetric_round_trip(password in "[a-zA-Z0-9]{1,32}", plaintext in any::<Vec<u8>>()) {
        let strategy = SymmetricStrategy::from_password(&password);

        let ciphertext = strategy.encrypt(&plaintext).expect("should encrypt");
        let recovered = strategy.decrypt(&ciphertext).expect("should decrypt");

        prop_assert_eq!(recovered, plaintext);
    }

    #[test]
    fn asymmetric_round_trip(plaintext in any::<Vec<u8>>()) {
        let alice = ClientKeys::generate();
        let bob = ClientKeys::generate();

        let sender = AsymmetricStrategy::new(&alice, &bob.public());
        let receiver = AsymmetricStrategy::new(&bob, &alice.public());

        let ciphertext = sender.encrypt(&plaintext).expect("should encrypt");
        let recovered = receiver.decrypt(&ciphertext).expect("should decrypt");

        prop_assert_eq!(recovered, plaintext);
    }

    #[test]
    fn tampering_any_byte_is_detected(
        plaintext in any::<Vec<u8>>(),
        position in any::<proptest::sample::Index>(),
    ) {
        let strategy = SymmetricStrategy::from_password("otp-property");

        let mut ciphertext = strategy.encrypt(&plaintext).expect("should encrypt");
        let index = position.index(ciphertext.len());
        ciphertext[index] ^= 0xFF;

        prop_assert!(strategy.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn signatures_bind_content(content in any::<Vec<u8>>(), other in any::<Vec<u8>>()) {
        let keys = ClientKeys::generate();
        let authenticator = MessageAuthenticator::new();

        let tag = authenticator.sign(&content, keys.signing_key());

        prop_assert!(authenticator.verify(&content, Some(&tag), &keys.public()));
        if content != other {
            prop_assert!(!authenticator.verify(&other, Some(&tag), &keys.public()));
        }
    }
}
