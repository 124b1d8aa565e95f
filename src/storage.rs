//! Key-value persistence backends

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;

use crate::errors::Error;

/// Storage key holding the serialized ledger
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Storage key holding the dark theme flag
pub const DARK_MODE_KEY: &str = "darkMode";

/// An interface to a flat string key-value store
pub trait Storage {
    /// Fetches the value stored under `key`, or `None` if nothing was ever stored
    fn load(&self, key: &str) -> Result<Option<String>, Error>;

    /// Stores `value` under `key`, replacing any previous value
    fn save(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Holds all values in an in-memory map.
///
/// # Limitations
/// No persistence.
#[derive(Default, Debug, Clone)]
pub struct MemoryStorage {
    /// Storage for the map of key to value
    pub(crate) values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates a new, empty [`MemoryStorage`].
    #[must_use]
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Stores each key as a `<key>.json` file inside a data directory.
///
/// The directory is created on the first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory holding one file per key
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `dir`; nothing is touched on disk until a write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no stored value at {}", path.display());
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Readers only ever see a complete file
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        debug!("stored {} bytes at {}", value.len(), path.display());
        Ok(())
    }
}
