//! Port for small persisted documents keyed by name.
//!
//! The activity log and the theme preference each persist one JSON document
//! under a fixed key. Values are opaque strings to the store.

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum KeyValueStoreError {
        /// The key cannot be used as a storage name.
        InvalidKey { key: String } => "invalid storage key: {key}",
        /// Reading or writing the backing storage failed.
        Io { key: String, message: String } => "storage I/O failed for {key}: {message}",
    }
}

/// Port for loading and saving persisted documents.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Load the document stored under `key`. Missing keys yield `None`.
    fn load(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Store `value` under `key`, replacing any previous document.
    fn save(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;

    /// Remove the document stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), KeyValueStoreError>;
}
