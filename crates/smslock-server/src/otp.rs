//! Out-of-band one-time password boundary.
//!
//! How the password reaches the joining operator (display, voice call, a
//! second channel) is outside this system; the server only needs to look up
//! what was issued for a given sender when the sealed registration arrives.

use std::collections::HashMap;

/// Source of the one-time passwords expected from joining clients.
pub trait OtpProvider: Send + Sync {
    /// The password issued to `sender` for the current join, if any.
    fn bootstrap_password(&self, sender: &str) -> Option<String>;
}

/// Issues one shared password to every sender.
///
/// Development and test use; a deployment wants per-sender passwords.
#[derive(Debug, Clone)]
pub struct FixedOtpProvider {
    password: String,
}

impl FixedOtpProvider {
    /// Create a provider that answers `password` for every sender.
    pub fn new(password: impl Into<String>) -> Self {
        Self { password: password.into() }
    }
}

impl OtpProvider for FixedOtpProvider {
    fn bootstrap_password(&self, _sender: &str) -> Option<String> {
        Some(self.password.clone())
    }
}

/// Per-sender password table.
#[derive(Debug, Clone, Default)]
pub struct TableOtpProvider {
    passwords: HashMap<String, String>,
}

impl TableOtpProvider {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue `password` for `sender`, replacing any previous issue.
    pub fn issue(&mut self, sender: impl Into<String>, password: impl Into<String>) {
        self.passwords.insert(sender.into(), password.into());
    }
}

impl OtpProvider for TableOtpProvider {
    fn bootstrap_password(&self, sender: &str) -> Option<String> {
        self.passwords.get(sender).cloned()
    }
}
