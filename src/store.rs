//! Key/value persistence for the API key and the last-searched city.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub const API_KEY: &str = "api_key";
pub const LAST_CITY: &str = "last_city";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store file is corrupted: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage seam injected into the application state, so handlers never touch
/// the filesystem directly.
pub trait KeyValue {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A flat JSON object on disk. Loaded once at startup, rewritten on every
/// `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `<config_dir>/owm/store.json`, creating the
    /// directory as needed. A missing file is an empty store.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?.join("owm");
        fs::create_dir_all(&dir)?;
        Self::open(dir.join("store.json"))
    }

    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValue for FileStore {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush()?;
        tracing::debug!("stored {key}");
        Ok(())
    }
}
