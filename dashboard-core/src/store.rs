//! Preference persistence.
//!
//! [`KeyValueStore`] is the raw string capability; [`PreferenceStore`] is the
//! single boundary through which the dashboard reads and writes the unit,
//! theme and last search.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::StoreError,
    model::{LocationDescriptor, Theme, UnitSystem},
};

pub const LAST_SEARCH_KEY: &str = "weather_last_search";
pub const UNIT_KEY: &str = "weather_unit";
pub const DARK_KEY: &str = "weather_dark";

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-process store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn lock(entries: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store backed by a single JSON object file.
///
/// The whole file is read on open and rewritten on every `set`. A file that
/// is not a string-to-string JSON object is treated as empty and replaced on
/// the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).unwrap_or_else(|e| {
                    tracing::warn!(
                        path = %path.display(),
                        "Ignoring malformed preference file: {e}"
                    );
                    BTreeMap::new()
                })
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    /// The in-memory map only changes once the file write succeeded.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Preferences restored once at startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preferences {
    pub units: UnitSystem,
    pub theme: Theme,
    pub last_search: Option<LocationDescriptor>,
}

/// Typed view over a [`KeyValueStore`].
pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Read every preference, using `default_units` when none is stored.
    pub fn load(&self, default_units: UnitSystem) -> Preferences {
        Preferences {
            units: self.units().unwrap_or(default_units),
            theme: self.theme(),
            last_search: self.last_search(),
        }
    }

    pub fn last_search(&self) -> Option<LocationDescriptor> {
        let raw = self.store.get(LAST_SEARCH_KEY)?;
        match serde_json::from_str::<Option<LocationDescriptor>>(&raw) {
            Ok(loc) => loc,
            Err(e) => {
                tracing::warn!("Ignoring malformed last search {raw:?}: {e}");
                None
            }
        }
    }

    pub fn set_last_search(&self, loc: &LocationDescriptor) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(loc)?;
        self.store.set(LAST_SEARCH_KEY, &encoded)
    }

    pub fn units(&self) -> Option<UnitSystem> {
        let raw = self.store.get(UNIT_KEY)?;
        match UnitSystem::try_from(raw.as_str()) {
            Ok(units) => Some(units),
            Err(e) => {
                tracing::warn!("Ignoring stored unit preference: {e}");
                None
            }
        }
    }

    pub fn set_units(&self, units: UnitSystem) -> Result<(), StoreError> {
        self.store.set(UNIT_KEY, units.as_str())
    }

    /// Stored as the flag strings "true"/"false"; anything else reads as light.
    pub fn theme(&self) -> Theme {
        match self.store.get(DARK_KEY).as_deref() {
            Some("true") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.store.set(DARK_KEY, if theme.is_dark() { "true" } else { "false" })
    }
}
