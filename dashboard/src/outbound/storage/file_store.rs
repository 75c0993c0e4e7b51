//! File-backed key-value store.
//!
//! Each key maps to `<key>.json` inside one directory opened through
//! `cap_std`, so the store cannot reach outside it. Writes go to a hidden
//! temporary file that is renamed over the target, so a crash never leaves
//! a half-written document behind.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Key-value store writing one JSON document per key.
pub struct FileKeyValueStore {
    dir: Dir,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }
}

fn file_name(key: &str) -> Result<String, KeyValueStoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(format!("{key}.json"))
    } else {
        Err(KeyValueStoreError::invalid_key(key))
    }
}

fn io_error(key: &str, error: &io::Error) -> KeyValueStoreError {
    KeyValueStoreError::io(key, error.to_string())
}

impl KeyValueStore for FileKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        let name = file_name(key)?;
        match self.dir.read_to_string(&name) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(key, &error)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        let name = file_name(key)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(".{name}.tmp.{}.{counter}", std::process::id());

        if let Err(error) = write_temp_file(&self.dir, &tmp_name, value) {
            drop(self.dir.remove_file(&tmp_name));
            return Err(io_error(key, &error));
        }
        if let Err(error) = self.dir.rename(&tmp_name, &self.dir, &name) {
            drop(self.dir.remove_file(&tmp_name));
            return Err(io_error(key, &error));
        }
        debug!(key, bytes = value.len(), "persisted document");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        let name = file_name(key)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(key, &error)),
        }
    }
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
