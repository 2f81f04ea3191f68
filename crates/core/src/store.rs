//! Local key-value persistence.
//!
//! History and the quick-symptom list are stored as serialized strings under fixed keys (see
//! [`crate::constants`]). Values are always rewritten whole; nothing patches a stored value in
//! place.
//!
//! Two implementations are provided:
//! - [`FileStore`] keeps one `<key>.json` file per key under a data directory
//! - [`MemoryStore`] keeps values in memory, for tests and throwaway sessions

use crate::{CoreError, CoreResult};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// A string store addressed by fixed keys.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` if the key has never been written.
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// Directory-backed store with one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StorageDirCreation` if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(CoreError::StorageDirCreation)?;
        Ok(Self { data_dir })
    }

    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        let ok = !key.is_empty()
            && key
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'));
        if !ok {
            return Err(CoreError::InvalidStoreKey(key.to_owned()));
        }
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CoreError::StoreRead {
                key: key.to_owned(),
                source,
            }),
        }
    }

    /// Writes through a uniquely named temp file in the data directory, then renames it over
    /// the target. Concurrent writers never share a temp file; the last rename wins.
    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        let write_err = |source| CoreError::StoreWrite {
            key: key.to_owned(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.data_dir).map_err(write_err)?;
        tmp.write_all(value.as_bytes()).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| CoreError::StoreLockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut values = self.values.lock().map_err(|_| CoreError::StoreLockPoisoned)?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        (**self).set(key, value)
    }
}
