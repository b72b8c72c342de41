//! Map markers and the map-click lookup.

use crate::{
    error::WeatherError,
    model::{Coordinates, CurrentConditions},
    service::WeatherService,
};

/// Initial view: centered on Europe.
pub const DEFAULT_CENTER: Coordinates = Coordinates { latitude: 50.0, longitude: 10.0 };
pub const DEFAULT_ZOOM: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub name: String,
    pub coord: Coordinates,
}

impl MapMarker {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), coord: Coordinates::new(latitude, longitude) }
    }
}

pub fn default_markers() -> Vec<MapMarker> {
    vec![
        MapMarker::new("London", 51.5074, -0.1278),
        MapMarker::new("Paris", 48.8566, 2.3522),
        MapMarker::new("Tokyo", 35.6762, 139.6503),
        MapMarker::new("New York", 40.7128, -74.0060),
        MapMarker::new("Sydney", -33.8688, 151.2093),
    ]
}

/// Conditions for a clicked point. The result stays anonymous (empty city).
pub async fn click(service: &WeatherService, coord: Coordinates) -> Result<CurrentConditions, WeatherError> {
    tracing::debug!(%coord, "map click");
    service.current_at(coord).await
}

/// Conditions at a marker, labelled with the marker's name.
pub async fn marker_weather(service: &WeatherService, marker: &MapMarker) -> Result<CurrentConditions, WeatherError> {
    let mut current = service.current_at(marker.coord).await?;
    current.city = marker.name.clone();
    Ok(current)
}
