//! Durable key-value slots.
//!
//! A slot holds one string under a fixed key, the way browser local storage
//! does. `MemoryStorage` is the in-process backend (clones share the same
//! slots); `FileStorage` keeps one file per key inside a directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::errors::{FormError, FormResult};

/// Slot holding the saved-forms collection.
pub const FORMS_KEY: &str = "upliance-forms";
/// Slot holding the theme mode string.
pub const THEME_KEY: &str = "upliance-theme";

pub trait KeyValueStore: Send + Sync {
    /// Read the slot; `None` if it was never written.
    fn read(&self, key: &str) -> FormResult<Option<String>>;

    /// Replace the slot's content.
    fn write(&mut self, key: &str, value: &str) -> FormResult<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn read(&self, key: &str) -> FormResult<Option<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| FormError::Storage("memory storage lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> FormResult<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| FormError::Storage("memory storage lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory.
    pub fn open<P: Into<PathBuf>>(dir: P) -> FormResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStorage {
    fn read(&self, key: &str) -> FormResult<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> FormResult<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!("wrote slot {key} to {}", path.display());
        Ok(())
    }
}
