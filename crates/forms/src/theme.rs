use strum::{Display, EnumString};

use crate::errors::FormResult;
use crate::storage::{KeyValueStore, THEME_KEY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// UI theme mode backed by its own slot, independent of the form data.
#[derive(Debug)]
pub struct ThemeStore<S> {
    storage: S,
    mode: ThemeMode,
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Read the persisted mode once. A missing or unknown value means light.
    pub fn open(storage: S) -> FormResult<Self> {
        let mode = match storage.read(THEME_KEY)? {
            None => ThemeMode::default(),
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("unknown theme mode {raw:?}, falling back to light");
                ThemeMode::default()
            }),
        };
        Ok(Self { storage, mode })
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn set(&mut self, mode: ThemeMode) -> FormResult<()> {
        self.storage.write(THEME_KEY, &mode.to_string())?;
        self.mode = mode;
        Ok(())
    }

    pub fn toggle(&mut self) -> FormResult<ThemeMode> {
        let mode = self.mode.toggled();
        self.set(mode)?;
        Ok(mode)
    }
}
