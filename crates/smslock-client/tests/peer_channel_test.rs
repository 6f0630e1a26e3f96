//! Peer channel tests over an in-process carrier.

use smslock_client::{ClientError, InMemoryTransport, PeerChannel, Received};
use smslock_crypto::{ClientKeys, SESSION_KEY_SIZE};
use smslock_proto::{Envelope, Message};

fn channel_pair() -> (PeerChannel<InMemoryTransport>, PeerChannel<InMemoryTransport>) {
    let alice = ClientKeys::generate();
    let bob = ClientKeys::generate();
    let (alice_end, bob_end) = InMemoryTransport::pair();

    let alice_channel =
        PeerChannel::with_identity("222", bob.public(), &alice, alice_end).unwrap();
    let bob_channel = PeerChannel::with_identity("111", alice.public(), &bob, bob_end).unwrap();

    (alice_channel, bob_channel)
}

#[test]
fn all_four_flag_combinations_round_trip() {
    let (mut alice, mut bob) = channel_pair();

    for (confidential, authenticate) in
        [(false, false), (true, false), (false, true), (true, true)]
    {
        alice.send("hello", confidential, authenticate).unwrap();

        let Received::Content { envelope, text } = bob.receive().unwrap() else {
            panic!("expected content for flags ({confidential}, {authenticate})");
        };

        assert_eq!(text, "hello");
        assert_eq!(
            bob.is_authentic(&envelope),
            authenticate,
            "authenticity for flags ({confidential}, {authenticate})"
        );
        if confidential {
            assert!(matches!(envelope.message, Message::EncryptedContent { .. }));
        } else {
            assert!(matches!(envelope.message, Message::PlainContent { .. }));
        }
    }
}

#[test]
fn conversation_flows_in_both_directions() {
    let (mut alice, mut bob) = channel_pair();

    alice.send("ping", true, true).unwrap();
    let Received::Content { text, .. } = bob.receive().unwrap() else {
        panic!("expected content");
    };
    assert_eq!(text, "ping");

    bob.send("pong", true, true).unwrap();
    let Received::Content { text, .. } = alice.receive().unwrap() else {
        panic!("expected content");
    };
    assert_eq!(text, "pong");
}

#[test]
fn verification_with_wrong_partner_identity_fails() {
    let alice = ClientKeys::generate();
    let bob = ClientKeys::generate();
    let eve = ClientKeys::generate();
    let (alice_end, bob_end) = InMemoryTransport::pair();

    let mut alice_channel =
        PeerChannel::with_identity("222", bob.public(), &alice, alice_end).unwrap();
    // Bob mistakenly believes the partner is Eve.
    let mut bob_channel =
        PeerChannel::with_identity("111", eve.public(), &bob, bob_end).unwrap();

    alice_channel.send("hello", false, true).unwrap();

    let Received::Content { envelope, text } = bob_channel.receive().unwrap() else {
        panic!("expected content");
    };
    assert_eq!(text, "hello");
    assert!(!bob_channel.is_authentic(&envelope));
}

#[test]
fn confidential_content_is_unreadable_with_wrong_keys() {
    let alice = ClientKeys::generate();
    let bob = ClientKeys::generate();
    let eve = ClientKeys::generate();
    let (alice_end, eve_end) = InMemoryTransport::pair();

    let mut alice_channel =
        PeerChannel::with_identity("222", bob.public(), &alice, alice_end).unwrap();
    let mut eve_channel =
        PeerChannel::with_identity("111", alice.public(), &eve, eve_end).unwrap();

    alice_channel.send("for bob only", true, false).unwrap();

    assert!(matches!(eve_channel.receive(), Err(ClientError::Crypto(_))));
}

#[test]
fn session_key_upgrade_round_trips_content() {
    let (mut alice, mut bob) = channel_pair();

    alice.establish_session().unwrap();
    assert!(alice.session_established());

    assert!(matches!(bob.receive().unwrap(), Received::SessionEstablished));
    assert!(bob.session_established());

    alice.send("under the session key", true, false).unwrap();
    let Received::Content { text, .. } = bob.receive().unwrap() else {
        panic!("expected content");
    };
    assert_eq!(text, "under the session key");

    bob.send("and back", true, true).unwrap();
    let Received::Content { envelope, text } = alice.receive().unwrap() else {
        panic!("expected content");
    };
    assert_eq!(text, "and back");
    assert!(alice.is_authentic(&envelope));
}

#[test]
fn plain_session_key_is_refused() {
    let (_alice, mut bob) = channel_pair();

    let line = Envelope::new(Message::SessionKey {
        session_key: vec![0u8; SESSION_KEY_SIZE],
        nonce: "a1b2c3d4e5".to_string(),
    })
    .to_line()
    .unwrap();

    assert!(matches!(bob.handle_line(&line), Err(ClientError::ProtocolMismatch(_))));
    assert!(!bob.session_established());
}

#[test]
fn tampered_ciphertext_surfaces_a_crypt_failure() {
    let (_alice, mut bob) = channel_pair();

    let line = Envelope::new(Message::EncryptedContent { ciphertext: vec![0u8; 64] })
        .to_line()
        .unwrap();

    assert!(matches!(bob.handle_line(&line), Err(ClientError::Crypto(_))));
}

#[test]
fn garbage_line_is_a_wire_error() {
    let (_alice, mut bob) = channel_pair();

    assert!(matches!(bob.handle_line("####"), Err(ClientError::Wire(_))));
}
