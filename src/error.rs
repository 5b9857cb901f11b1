//! Error types shared by the paging and dispatch layers.

use thiserror::Error;

/// A failed fetch reported by a data collaborator.
///
/// The message is surfaced to the UI as data, never rethrown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message, or `fallback` when the collaborator gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() {
            fallback.to_string()
        } else {
            self.message.clone()
        }
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Errors raised while assembling a reducer registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Reducer already registered for state {state} and event {event}")]
    Duplicate { state: String, event: String },

    #[error("No reducer registered for state {state} and event {event}")]
    Missing { state: String, event: String },
}
