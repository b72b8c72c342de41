//! Flat string key/value persistence for client-side preferences.
//!
//! Values live in a single JSON object file. When no file location is
//! available the store still works: reads yield the caller's default and
//! writes are dropped. Unreadable or corrupt data is treated as absent.
//!
//! Writes go through a temp file renamed over the original, so an interrupted
//! write never leaves a half-written file. A file that is already corrupt is
//! kept as `<name>.corrupt` rather than overwritten.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Keys shared by the components that persist state.
pub mod keys {
    pub const FAVORITE_CITIES: &str = "favorite-cities";
    pub const SEARCH_HISTORY: &str = "search-history";
    pub const TEMPERATURE_UNIT: &str = "temperature-unit";
    pub const WIND_UNIT: &str = "wind-unit";
    pub const PRESSURE_UNIT: &str = "pressure-unit";
    pub const DARK_MODE: &str = "dark-mode";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const AUTO_REFRESH: &str = "auto-refresh";
    pub const REFRESH_INTERVAL: &str = "refresh-interval";
    pub const NOTIFICATIONS_ENABLED: &str = "notifications-enabled";
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    /// Store backed by the JSON file at `path`. The file need not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// Store for contexts without durable storage.
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        self.update(key, |map| {
            map.insert(key.to_string(), value);
        });
    }

    pub fn remove(&self, key: &str) {
        self.update(key, |map| {
            map.remove(key);
        });
    }

    /// Deserialize the JSON stored under `key`; corrupt text reads as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring corrupt stored value");
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, json),
            Err(e) => tracing::warn!(key, error = %e, "failed to serialize value, not stored"),
        }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let Some(path) = self.path.as_deref() else {
            return BTreeMap::new();
        };

        match read_map(path) {
            Stored::Map(map) => map,
            Stored::Unreadable(e) => {
                tracing::warn!(path = %path.display(), error = %e, "preferences unreadable, using defaults");
                BTreeMap::new()
            }
            Stored::Corrupt(e) => {
                tracing::warn!(path = %path.display(), error = %e, "preferences file corrupt, using defaults");
                BTreeMap::new()
            }
        }
    }

    /// Read-modify-write of the whole file.
    ///
    /// A corrupt file is moved aside before the first write replaces it; an
    /// unreadable one is left alone and the write is dropped.
    fn update(&self, key: &str, change: impl FnOnce(&mut BTreeMap<String, String>)) {
        let Some(path) = self.path.as_deref() else {
            tracing::debug!(key, "no durable storage, write dropped");
            return;
        };

        let mut map = match read_map(path) {
            Stored::Map(map) => map,
            Stored::Unreadable(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "preferences unreadable, write dropped");
                return;
            }
            Stored::Corrupt(e) => {
                let aside = corrupt_path(path);
                if let Err(move_err) = fs::rename(path, &aside) {
                    tracing::warn!(
                        key,
                        path = %path.display(),
                        error = %move_err,
                        "could not move corrupt preferences aside, write dropped"
                    );
                    return;
                }
                tracing::warn!(
                    key,
                    path = %path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "preferences file corrupt, moved aside and starting fresh"
                );
                BTreeMap::new()
            }
        };
        change(&mut map);

        if let Err(e) = write_map(path, &map) {
            tracing::warn!(key, path = %path.display(), error = %e, "failed to persist preference");
        }
    }
}

enum Stored {
    Map(BTreeMap<String, String>),
    Corrupt(String),
    Unreadable(io::Error),
}

fn read_map(path: &Path) -> Stored {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(map) => Stored::Map(map),
            Err(e) => Stored::Corrupt(e.to_string()),
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Stored::Map(BTreeMap::new()),
        // Non-UTF-8 bytes are damage too, not an access problem.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Stored::Corrupt(e.to_string()),
        Err(e) => Stored::Unreadable(e),
    }
}

/// `preferences.json` -> `preferences.json.corrupt`
fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

/// Write to a temp file next to `path`, then rename it over `path`.
fn write_map(path: &Path, map: &BTreeMap<String, String>) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(map).map_err(io::Error::other)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
