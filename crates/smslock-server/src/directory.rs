//! Phone number → public identity registry.
//!
//! Source of truth for peer discovery. Append/lookup only in current scope:
//! entries are created by a successful join and never mutated; there is no
//! removal path. Registration rejects duplicates instead of overwriting, so
//! a second join for a known number can never replace the original key.

#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use smslock_crypto::PublicIdentity;
use thiserror::Error;

/// Errors from directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The phone number is already registered; the original entry survives.
    #[error("phone number {phone} is already registered")]
    DuplicateEntry {
        /// The contested phone number
        phone: String,
    },

    /// No client is registered under the requested phone number.
    #[error("no client registered for phone number {phone}")]
    ClientNotFound {
        /// The phone number that missed
        phone: String,
    },

    /// Registration was attempted with an empty phone number.
    #[error("phone number is empty")]
    EmptyPhone,
}

/// In-memory registry mapping phone numbers to public identities.
///
/// Thread-safe via `Arc<Mutex<_>>`; `Clone` shares the same underlying
/// storage, which is how the dispatcher's handlers all see one directory.
#[derive(Debug, Clone, Default)]
pub struct KeyDirectory {
    entries: Arc<Mutex<HashMap<String, PublicIdentity>>>,
}

impl KeyDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `identity` under `phone`.
    ///
    /// The duplicate check and the insert are one critical section, so two
    /// concurrent joins for the same number cannot both succeed.
    ///
    /// # Errors
    ///
    /// - `EmptyPhone` if `phone` is empty
    /// - `DuplicateEntry` if the number is already registered
    pub fn register(&self, phone: &str, identity: PublicIdentity) -> Result<(), DirectoryError> {
        if phone.is_empty() {
            return Err(DirectoryError::EmptyPhone);
        }

        let mut entries = self.entries.lock().expect("KeyDirectory mutex poisoned");
        if entries.contains_key(phone) {
            return Err(DirectoryError::DuplicateEntry { phone: phone.to_string() });
        }
        entries.insert(phone.to_string(), identity);
        Ok(())
    }

    /// Look up the identity registered under `phone`.
    ///
    /// # Errors
    ///
    /// - `ClientNotFound` if the number is not registered
    pub fn resolve(&self, phone: &str) -> Result<PublicIdentity, DirectoryError> {
        let entries = self.entries.lock().expect("KeyDirectory mutex poisoned");
        entries
            .get(phone)
            .copied()
            .ok_or_else(|| DirectoryError::ClientNotFound { phone: phone.to_string() })
    }

    /// A snapshot of every registered entry, ordered by phone number.
    pub fn snapshot(&self) -> BTreeMap<String, PublicIdentity> {
        let entries = self.entries.lock().expect("KeyDirectory mutex poisoned");
        entries.iter().map(|(phone, identity)| (phone.clone(), *identity)).collect()
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().expect("KeyDirectory mutex poisoned");
        entries.len()
    }

    /// Whether no client has joined yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
