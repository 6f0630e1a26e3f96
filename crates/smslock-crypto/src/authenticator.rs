//! Message authentication with Ed25519 over canonical message bytes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};

use crate::keys::PublicIdentity;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Computes and checks authentication tags over canonical message bytes.
///
/// The canonical bytes are produced by the message layer (the serialized
/// message excluding its authentication slot); this type neither knows nor
/// cares about message structure. Stateless aside from the algorithm choice,
/// so one instance is safe to share across channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageAuthenticator;

impl MessageAuthenticator {
    /// Create an authenticator.
    pub fn new() -> Self {
        Self
    }

    /// Sign the canonical bytes, returning the 64-byte tag.
    pub fn sign(&self, canonical: &[u8], signer: &SigningKey) -> Vec<u8> {
        signer.sign(canonical).to_bytes().to_vec()
    }

    /// Check a claimed tag against the canonical bytes.
    ///
    /// Fails closed: a missing tag, a tag of the wrong length, an invalid
    /// claimed key, or a signature mismatch all report `false`.
    pub fn verify(&self, canonical: &[u8], tag: Option<&[u8]>, claimed: &PublicIdentity) -> bool {
        let Some(tag) = tag else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(tag) else {
            return false;
        };
        let Ok(key) = claimed.verifying_key() else {
            return false;
        };
        key.verify(canonical, &signature).is_ok()
    }
}
