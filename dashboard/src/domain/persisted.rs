//! Versioned JSON envelope for documents kept in a [`KeyValueStore`].
//!
//! Documents are stored as `{"state": ..., "version": 0}` so existing
//! browser-persisted stores read back unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ports::KeyValueStore;

const ENVELOPE_VERSION: u32 = 0;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

/// Load the state stored under `key`.
///
/// Missing, unreadable and unparsable documents all yield `None`; the
/// failure is logged.
pub(crate) fn load_state<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.load(key) {
        Ok(raw) => raw?,
        Err(error) => {
            warn!(key, error = %error, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) => Some(envelope.state),
        Err(error) => {
            warn!(key, error = %error, "ignoring unreadable persisted state");
            None
        }
    }
}

/// Persist `state` under `key`. Failures are logged and otherwise ignored.
pub(crate) fn save_state<T: Serialize>(store: &dyn KeyValueStore, key: &str, state: &T) {
    let envelope = Envelope {
        state,
        version: ENVELOPE_VERSION,
    };
    let result = serde_json::to_string(&envelope)
        .map_err(|error| error.to_string())
        .and_then(|json| store.save(key, &json).map_err(|error| error.to_string()));
    if let Err(error) = result {
        warn!(key, error = %error, "failed to persist state");
    }
}
