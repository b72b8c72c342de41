use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::codes::{Compass, WeatherIcon};

/// Label shown for conditions that came from an anonymous coordinate lookup.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Current conditions for one place, already rounded to display precision.
///
/// `city` and `country` are empty only when the lookup was made by bare
/// coordinates (map click, geolocation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    /// °C
    pub temperature: i32,
    /// °C
    pub feels_like: i32,
    /// %
    pub humidity: i32,
    /// hPa
    pub pressure: i32,
    /// km/h
    pub wind_speed: i32,
    pub wind_direction: Compass,
    pub description: String,
    pub icon: WeatherIcon,
    /// km
    pub visibility: i32,
    pub uv_index: i32,
    /// HH:MM, location-local
    pub sunrise: String,
    /// HH:MM, location-local
    pub sunset: String,
    pub coord: Coordinates,
}

impl CurrentConditions {
    /// Name to show for this place.
    pub fn display_name(&self) -> String {
        match (self.city.is_empty(), self.country.is_empty()) {
            (true, _) => CURRENT_LOCATION_LABEL.to_string(),
            (false, true) => self.city.clone(),
            (false, false) => format!("{}, {}", self.city, self.country),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// "Today", "Tomorrow" or a weekday name.
    pub day: String,
    pub high: i32,
    pub low: i32,
    pub icon: WeatherIcon,
    pub description: String,
}

/// Highest high and lowest low across a forecast.
pub fn forecast_range(days: &[ForecastDay]) -> Option<(i32, i32)> {
    let high = days.iter().map(|d| d.high).max()?;
    let low = days.iter().map(|d| d.low).min()?;
    Some((high, low))
}

/// One geocoding match, as offered for autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityCandidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(region) = self.admin1.as_deref().filter(|r| !r.is_empty() && *r != self.name) {
            parts.push(region);
        }
        if !self.country.is_empty() {
            parts.push(self.country.as_str());
        }
        parts.join(", ")
    }
}

/// A saved city with its last known weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCity {
    pub id: String,
    pub name: String,
    pub country: String,
    pub temperature: i32,
    pub description: String,
    pub icon: WeatherIcon,
    pub last_updated: DateTime<Utc>,
}

impl FavoriteCity {
    pub fn id_for(city: &str, country: &str) -> String {
        format!("{city}-{country}")
    }

    pub fn from_conditions(current: &CurrentConditions, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::id_for(&current.city, &current.country),
            name: current.city.clone(),
            country: current.country.clone(),
            temperature: current.temperature,
            description: current.description.clone(),
            icon: current.icon,
            last_updated: now,
        }
    }

    /// Free-text query used to look the city up again.
    pub fn query(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    /// Relative age of the stored weather, e.g. "5m ago".
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let minutes = (now - self.last_updated).num_minutes();
        if minutes < 1 {
            return "Just now".to_string();
        }
        if minutes < 60 {
            return format!("{minutes}m ago");
        }
        let hours = minutes / 60;
        if hours < 24 {
            return format!("{hours}h ago");
        }
        format!("{}d ago", hours / 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn favorite_at(last_updated: DateTime<Utc>) -> FavoriteCity {
        FavoriteCity {
            id: "Oslo-Norway".into(),
            name: "Oslo".into(),
            country: "Norway".into(),
            temperature: 3,
            description: "Overcast".into(),
            icon: WeatherIcon::Overcast,
            last_updated,
        }
    }

    #[test]
    fn age_label_buckets() {
        let then = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let fav = favorite_at(then);

        assert_eq!(fav.age_label(then + Duration::seconds(30)), "Just now");
        assert_eq!(fav.age_label(then + Duration::minutes(42)), "42m ago");
        assert_eq!(fav.age_label(then + Duration::minutes(185)), "3h ago");
        assert_eq!(fav.age_label(then + Duration::days(2)), "2d ago");
    }

    #[test]
    fn favorite_serializes_with_camel_case_keys() {
        let then = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(favorite_at(then)).unwrap();

        assert_eq!(json["lastUpdated"], "2024-03-01T12:00:00Z");
        assert_eq!(json["icon"], "overcast");
    }

    #[test]
    fn forecast_range_of_empty_is_none() {
        assert_eq!(forecast_range(&[]), None);
    }

    #[test]
    fn candidate_label_skips_duplicate_region() {
        let c = CityCandidate {
            name: "Berlin".into(),
            country: "Germany".into(),
            admin1: Some("Berlin".into()),
            latitude: 52.52,
            longitude: 13.41,
        };
        assert_eq!(c.label(), "Berlin, Germany");
    }
}
