//! Port for the shareable query-string state backing the table view.
//!
//! The browser address bar is the canonical example: named parameters that
//! can be read individually and updated as one batch so observers never see
//! a half-applied change.

use super::define_port_error;

define_port_error! {
    /// Errors raised by query state adapters.
    pub enum QueryStateError {
        /// The underlying state could not be updated.
        Unavailable { message: String } => "query state unavailable: {message}",
    }
}

/// One change to a named query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryUpdate {
    /// Set `name` to `value`, replacing any previous values.
    Set { name: String, value: String },
    /// Remove `name` entirely.
    Remove { name: String },
}

impl QueryUpdate {
    /// Build a [`QueryUpdate::Set`].
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build a [`QueryUpdate::Remove`].
    pub fn remove(name: impl Into<String>) -> Self {
        Self::Remove { name: name.into() }
    }

    /// Parameter this update touches.
    pub fn name(&self) -> &str {
        match self {
            Self::Set { name, .. } | Self::Remove { name } => name,
        }
    }
}

/// Port for reading and atomically updating named query parameters.
#[cfg_attr(test, mockall::automock)]
pub trait QueryState: Send + Sync {
    /// Current value of `name`, if present.
    fn get(&self, name: &str) -> Option<String>;

    /// Apply every update as one change.
    fn apply(&self, updates: &[QueryUpdate]) -> Result<(), QueryStateError>;
}
