use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    geocode::DEFAULT_GEOCODING_URL, model::Coordinates, provider::open_meteo::DEFAULT_FORECAST_URL,
    store::PreferenceStore,
};

const PREFERENCES_FILE: &str = "preferences.json";

/// Base URLs of the remote APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub geocoding_url: String,
    pub forecast_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// City shown when none is given, e.g. "Kyiv".
    pub default_city: Option<String>,

    /// Where `preferences.json` lives; the platform data dir when unset.
    pub data_dir: Option<PathBuf>,

    /// Position reported as "my location".
    ///
    /// Example TOML:
    /// [home]
    /// latitude = 50.45
    /// longitude = 30.52
    pub home: Option<Coordinates>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Return the configured default city.
    pub fn default_city(&self) -> Result<&str> {
        self.default_city.as_deref().filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No default city configured.\n\
                 Hint: pass a city (e.g. `weather show Kyiv`) or run `weather configure` first."
            )
        })
    }

    pub fn set_default_city(&mut self, city: &str) {
        let city = city.trim();
        self.default_city = (!city.is_empty()).then(|| city.to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = project_dirs().ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Location of the preferences file, if the platform offers a data directory.
    pub fn preferences_path(&self) -> Option<PathBuf> {
        match &self.data_dir {
            Some(dir) => Some(dir.join(PREFERENCES_FILE)),
            None => project_dirs().map(|dirs| dirs.data_dir().join(PREFERENCES_FILE)),
        }
    }

    /// Preference store for this configuration; a no-op store without a data directory.
    pub fn preference_store(&self) -> PreferenceStore {
        match self.preferences_path() {
            Some(path) => PreferenceStore::open(path),
            None => {
                tracing::warn!("no data directory available, preferences will not be saved");
                PreferenceStore::unavailable()
            }
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "weather-dashboard", "weather")
}
