//! Application state module

use std::fmt;
use std::sync::Arc;

use contactline_smtp::{Connector, Mailer};

use crate::config::CredentialSource;

/// Global application state
pub struct AppState<C> {
    /// Mailer bound to the configured relay
    pub mailer: Arc<Mailer<C>>,

    /// Where the mail account credentials come from
    pub credentials: Arc<CredentialSource>,

    /// Display name on the From header
    pub sender_name: Arc<str>,
}

impl<C: Connector> AppState<C> {
    /// Create a new application state
    #[must_use]
    pub fn new(mailer: Mailer<C>, credentials: CredentialSource, sender_name: &str) -> Self {
        Self {
            mailer: Arc::new(mailer),
            credentials: Arc::new(credentials),
            sender_name: Arc::from(sender_name),
        }
    }
}

// Derived Clone would require `C: Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            mailer: Arc::clone(&self.mailer),
            credentials: Arc::clone(&self.credentials),
            sender_name: Arc::clone(&self.sender_name),
        }
    }
}

impl<C: Connector> fmt::Debug for AppState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("relay", self.mailer.relay())
            .field("credentials", &self.credentials)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}
