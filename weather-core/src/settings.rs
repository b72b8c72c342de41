//! Display preferences. Each value is stored under its own key and falls back
//! to its own default when absent or unreadable.

use std::str::FromStr;
use thiserror::Error;

use crate::{
    codes::round_half_up,
    store::{PreferenceStore, keys},
};

pub const DEFAULT_REFRESH_INTERVAL_MIN: u32 = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown setting '{0}'. Known settings: {known}", known = SETTING_NAMES.join(", "))]
    UnknownSetting(String),

    #[error("Invalid value '{value}' for {setting}")]
    InvalidValue { setting: &'static str, value: String },
}

const SETTING_NAMES: [&str; 7] = [
    keys::TEMPERATURE_UNIT,
    keys::WIND_UNIT,
    keys::PRESSURE_UNIT,
    keys::DARK_MODE,
    keys::NOTIFICATIONS,
    keys::AUTO_REFRESH,
    keys::REFRESH_INTERVAL,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    pub fn convert(&self, celsius: i32) -> i32 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => round_half_up(celsius as f64 * 9.0 / 5.0 + 32.0),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    pub fn format(&self, celsius: i32) -> String {
        format!("{}{}", self.convert(celsius), self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "celsius" => Ok(Self::Celsius),
            "fahrenheit" => Ok(Self::Fahrenheit),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindUnit {
    #[default]
    Kmh,
    Mph,
}

impl WindUnit {
    const MPH_PER_KMH: f64 = 0.621_371;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Mph => "mph",
        }
    }

    pub fn format(&self, kmh: i32) -> String {
        match self {
            Self::Kmh => format!("{kmh} km/h"),
            Self::Mph => format!("{} mph", round_half_up(kmh as f64 * Self::MPH_PER_KMH)),
        }
    }
}

impl FromStr for WindUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kmh" => Ok(Self::Kmh),
            "mph" => Ok(Self::Mph),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressureUnit {
    #[default]
    Hpa,
    InHg,
}

impl PressureUnit {
    const INHG_PER_HPA: f64 = 0.029_53;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hpa => "hpa",
            Self::InHg => "inHg",
        }
    }

    pub fn format(&self, hpa: i32) -> String {
        match self {
            Self::Hpa => format!("{hpa} hPa"),
            Self::InHg => format!("{:.2} inHg", hpa as f64 * Self::INHG_PER_HPA),
        }
    }
}

impl FromStr for PressureUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hpa" => Ok(Self::Hpa),
            "inHg" => Ok(Self::InHg),
            _ => Err(()),
        }
    }
}

/// Coarse band used to color temperatures, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Freezing,
    Cold,
    Mild,
    Warm,
    Hot,
}

impl TemperatureBand {
    pub fn for_celsius(temp: i32) -> Self {
        match temp {
            t if t < 0 => Self::Freezing,
            t if t < 10 => Self::Cold,
            t if t < 20 => Self::Mild,
            t if t < 30 => Self::Warm,
            _ => Self::Hot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub temperature_unit: TemperatureUnit,
    pub wind_unit: WindUnit,
    pub pressure_unit: PressureUnit,
    pub dark_mode: bool,
    pub notifications: bool,
    pub auto_refresh: bool,
    /// Minutes, at least 1.
    pub refresh_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            wind_unit: WindUnit::default(),
            pressure_unit: PressureUnit::default(),
            dark_mode: false,
            notifications: true,
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MIN,
        }
    }
}

fn parse_interval(raw: &str) -> Option<u32> {
    raw.trim().parse().ok().filter(|m| *m >= 1)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl Settings {
    pub fn load(store: &PreferenceStore) -> Self {
        let defaults = Self::default();

        fn read<T>(store: &PreferenceStore, key: &str, parse: impl Fn(&str) -> Option<T>, default: T) -> T {
            match store.get(key) {
                Some(raw) => parse(&raw).unwrap_or_else(|| {
                    tracing::debug!(key, value = %raw, "unrecognized setting value, using default");
                    default
                }),
                None => default,
            }
        }

        Self {
            temperature_unit: read(store, keys::TEMPERATURE_UNIT, |s| s.parse().ok(), defaults.temperature_unit),
            wind_unit: read(store, keys::WIND_UNIT, |s| s.parse().ok(), defaults.wind_unit),
            pressure_unit: read(store, keys::PRESSURE_UNIT, |s| s.parse().ok(), defaults.pressure_unit),
            dark_mode: read(store, keys::DARK_MODE, parse_bool, defaults.dark_mode),
            notifications: read(store, keys::NOTIFICATIONS, parse_bool, defaults.notifications),
            auto_refresh: read(store, keys::AUTO_REFRESH, parse_bool, defaults.auto_refresh),
            refresh_interval: read(store, keys::REFRESH_INTERVAL, parse_interval, defaults.refresh_interval),
        }
    }

    pub fn save(&self, store: &PreferenceStore) {
        store.set(keys::TEMPERATURE_UNIT, self.temperature_unit.as_str());
        store.set(keys::WIND_UNIT, self.wind_unit.as_str());
        store.set(keys::PRESSURE_UNIT, self.pressure_unit.as_str());
        store.set(keys::DARK_MODE, self.dark_mode.to_string());
        store.set(keys::NOTIFICATIONS, self.notifications.to_string());
        store.set(keys::AUTO_REFRESH, self.auto_refresh.to_string());
        store.set(keys::REFRESH_INTERVAL, self.refresh_interval.to_string());
    }

    /// Back to defaults, persisted immediately.
    pub fn reset_to_defaults(&mut self, store: &PreferenceStore) {
        *self = Self::default();
        self.save(store);
    }

    /// Change one setting by its stored key name.
    pub fn apply(&mut self, name: &str, value: &str) -> Result<(), SettingsError> {
        fn invalid(setting: &'static str, value: &str) -> SettingsError {
            SettingsError::InvalidValue { setting, value: value.to_string() }
        }

        match name {
            keys::TEMPERATURE_UNIT => {
                self.temperature_unit = value.parse().map_err(|_| invalid(keys::TEMPERATURE_UNIT, value))?
            }
            keys::WIND_UNIT => self.wind_unit = value.parse().map_err(|_| invalid(keys::WIND_UNIT, value))?,
            keys::PRESSURE_UNIT => {
                self.pressure_unit = value.parse().map_err(|_| invalid(keys::PRESSURE_UNIT, value))?
            }
            keys::DARK_MODE => self.dark_mode = parse_bool(value).ok_or_else(|| invalid(keys::DARK_MODE, value))?,
            keys::NOTIFICATIONS => {
                self.notifications = parse_bool(value).ok_or_else(|| invalid(keys::NOTIFICATIONS, value))?
            }
            keys::AUTO_REFRESH => {
                self.auto_refresh = parse_bool(value).ok_or_else(|| invalid(keys::AUTO_REFRESH, value))?
            }
            keys::REFRESH_INTERVAL => {
                self.refresh_interval =
                    parse_interval(value).ok_or_else(|| invalid(keys::REFRESH_INTERVAL, value))?
            }
            other => return Err(SettingsError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::TEMPERATURE_UNIT, self.temperature_unit.as_str().to_string()),
            (keys::WIND_UNIT, self.wind_unit.as_str().to_string()),
            (keys::PRESSURE_UNIT, self.pressure_unit.as_str().to_string()),
            (keys::DARK_MODE, self.dark_mode.to_string()),
            (keys::NOTIFICATIONS, self.notifications.to_string()),
            (keys::AUTO_REFRESH, self.auto_refresh.to_string()),
            (keys::REFRESH_INTERVAL, self.refresh_interval.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json"));
        (dir, store)
    }

    #[test]
    fn reset_overwrites_stored_values() {
        let (_dir, store) = temp_store();
        let mut settings = Settings::default();
        settings.apply(keys::WIND_UNIT, "mph").unwrap();
        settings.apply(keys::REFRESH_INTERVAL, "30").unwrap();
        settings.save(&store);

        let mut loaded = Settings::load(&store);
        assert_eq!(loaded.refresh_interval, 30);
        loaded.reset_to_defaults(&store);

        assert_eq!(loaded, Settings::default());
        assert_eq!(Settings::load(&store), Settings::default());
        assert_eq!(store.get(keys::WIND_UNIT).as_deref(), Some("kmh"));
    }

    #[test]
    fn empty_store_gives_defaults() {
        let (_dir, store) = temp_store();
        let settings = Settings::load(&store);

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.refresh_interval, 15);
        assert!(settings.notifications);
        assert!(!settings.dark_mode);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (_dir, store) = temp_store();
        let mut settings = Settings::default();
        settings.apply("temperature-unit", "fahrenheit").unwrap();
        settings.apply("pressure-unit", "inHg").unwrap();
        settings.apply("refresh-interval", "30").unwrap();
        settings.apply("auto-refresh", "false").unwrap();
        settings.save(&store);

        assert_eq!(Settings::load(&store), settings);
        assert_eq!(store.get(keys::PRESSURE_UNIT).as_deref(), Some("inHg"));
    }

    #[test]
    fn each_key_defaults_independently() {
        let (_dir, store) = temp_store();
        store.set(keys::WIND_UNIT, "mph");
        store.set(keys::TEMPERATURE_UNIT, "kelvin");
        store.set(keys::REFRESH_INTERVAL, "0");

        let settings = Settings::load(&store);

        assert_eq!(settings.wind_unit, WindUnit::Mph);
        assert_eq!(settings.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(settings.refresh_interval, DEFAULT_REFRESH_INTERVAL_MIN);
    }

    #[test]
    fn apply_rejects_bad_input() {
        let mut settings = Settings::default();

        assert_eq!(
            settings.apply("wind-unit", "knots"),
            Err(SettingsError::InvalidValue { setting: "wind-unit", value: "knots".into() })
        );
        assert!(matches!(settings.apply("theme", "dark"), Err(SettingsError::UnknownSetting(_))));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(TemperatureUnit::Fahrenheit.convert(0), 32);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(-40), -40);
        assert_eq!(TemperatureUnit::Fahrenheit.format(22), "72°F");
        assert_eq!(TemperatureUnit::Celsius.format(22), "22°C");
        assert_eq!(WindUnit::Mph.format(100), "62 mph");
        assert_eq!(WindUnit::Kmh.format(12), "12 km/h");
        assert_eq!(PressureUnit::InHg.format(1013), "29.91 inHg");
        assert_eq!(PressureUnit::Hpa.format(1013), "1013 hPa");
    }

    #[test]
    fn temperature_bands() {
        assert_eq!(TemperatureBand::for_celsius(-1), TemperatureBand::Freezing);
        assert_eq!(TemperatureBand::for_celsius(0), TemperatureBand::Cold);
        assert_eq!(TemperatureBand::for_celsius(19), TemperatureBand::Mild);
        assert_eq!(TemperatureBand::for_celsius(20), TemperatureBand::Warm);
        assert_eq!(TemperatureBand::for_celsius(30), TemperatureBand::Hot);
    }
}
