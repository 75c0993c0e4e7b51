//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Key-value store that keeps documents for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    documents: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_removes_documents() {
        let store = InMemoryKeyValueStore::new();
        store.save("k", "v").expect("save");
        assert_eq!(store.load("k").expect("load").as_deref(), Some("v"));
        store.remove("k").expect("remove");
        assert_eq!(store.load("k").expect("load"), None);
    }
}
