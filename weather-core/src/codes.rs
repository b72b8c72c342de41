//! Pure lookups and conversions shared by the normalizer.
//!
//! - WMO weather code → icon key and description
//! - wind degrees → 8-point compass
//! - calendar date → "Today" / "Tomorrow" / weekday
//! - provider local timestamps → `HH:MM`

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Symbolic icon key understood by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherIcon {
    Sunny,
    GenericCloudy,
    Overcast,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "sunny",
            WeatherIcon::GenericCloudy => "generic-cloudy",
            WeatherIcon::Overcast => "overcast",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Thunderstorm => "thunderstorm",
        }
    }
}

impl std::fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const UNKNOWN_ICON: WeatherIcon = WeatherIcon::GenericCloudy;
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Icon and description for a WMO code, `None` when the code is not in the table.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn lookup(code: i32) -> Option<(WeatherIcon, &'static str)> {
    use WeatherIcon::*;

    let entry = match code {
        0 => (Sunny, "Clear sky"),
        1 => (Sunny, "Mainly clear"),
        2 => (GenericCloudy, "Partly cloudy"),
        3 => (Overcast, "Overcast"),
        45 => (Fog, "Fog"),
        48 => (Fog, "Depositing rime fog"),
        51 => (Rain, "Light drizzle"),
        53 => (Rain, "Moderate drizzle"),
        55 => (Rain, "Dense drizzle"),
        61 => (Rain, "Slight rain"),
        63 => (Rain, "Moderate rain"),
        65 => (Rain, "Heavy rain"),
        71 => (Snow, "Slight snow fall"),
        73 => (Snow, "Moderate snow fall"),
        75 => (Snow, "Heavy snow fall"),
        77 => (Snow, "Snow grains"),
        80 => (Rain, "Slight rain showers"),
        81 => (Rain, "Moderate rain showers"),
        82 => (Rain, "Violent rain showers"),
        85 => (Snow, "Slight snow showers"),
        86 => (Snow, "Heavy snow showers"),
        95 => (Thunderstorm, "Thunderstorm"),
        96 => (Thunderstorm, "Thunderstorm with slight hail"),
        99 => (Thunderstorm, "Thunderstorm with heavy hail"),
        _ => return None,
    };

    Some(entry)
}

pub fn icon_for(code: i32) -> WeatherIcon {
    lookup(code).map(|(icon, _)| icon).unwrap_or(UNKNOWN_ICON)
}

pub fn description_for(code: i32) -> &'static str {
    lookup(code).map(|(_, text)| text).unwrap_or(UNKNOWN_DESCRIPTION)
}

/// Rounds halves toward positive infinity, so -2.5 becomes -2.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "NW")]
    NorthWest,
}

impl Compass {
    const POINTS: [Compass; 8] = [
        Compass::North,
        Compass::NorthEast,
        Compass::East,
        Compass::SouthEast,
        Compass::South,
        Compass::SouthWest,
        Compass::West,
        Compass::NorthWest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Compass::North => "N",
            Compass::NorthEast => "NE",
            Compass::East => "E",
            Compass::SouthEast => "SE",
            Compass::South => "S",
            Compass::SouthWest => "SW",
            Compass::West => "W",
            Compass::NorthWest => "NW",
        }
    }
}

impl std::fmt::Display for Compass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn wind_direction(degrees: f64) -> Compass {
    let index = round_half_up(degrees / 45.0).rem_euclid(8) as usize;
    Compass::POINTS[index]
}

/// "Today", "Tomorrow", or the full weekday name of `date`.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%A").to_string()
    }
}

/// Parses the provider's local timestamps (`2024-05-01T06:12`, seconds optional).
pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// 24h `HH:MM` for a provider local timestamp.
pub fn format_clock(raw: &str) -> Option<String> {
    parse_local_timestamp(raw).map(|ts| ts.format("%H:%M").to_string())
}
