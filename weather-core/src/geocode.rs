//! City name → coordinates via the Open-Meteo geocoding API (no API key required).

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{CityCandidate, Coordinates},
    provider::fetch_body,
};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const AUTOCOMPLETE_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Vec<CityCandidate>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
    http: Client,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Coordinates of the best match for `city`.
    pub async fn resolve(&self, city: &str) -> Result<Coordinates, WeatherError> {
        self.resolve_place(city).await.map(|place| place.coordinates())
    }

    /// Best match for `city` including its name and country.
    pub async fn resolve_place(&self, city: &str) -> Result<CityCandidate, WeatherError> {
        let mut results = self.query(city, 1).await?;
        if results.is_empty() {
            return Err(WeatherError::NotFound(city.to_string()));
        }
        Ok(results.swap_remove(0))
    }

    /// Up to `limit` candidates for autocomplete. No match is an empty list.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>, WeatherError> {
        let mut results = self.query(query, limit).await?;
        results.truncate(limit);
        Ok(results)
    }

    async fn query(&self, name: &str, count: usize) -> Result<Vec<CityCandidate>, WeatherError> {
        let url = format!("{}/search", self.base_url);
        let count = count.to_string();

        tracing::debug!(%name, %count, "geocoding request");

        let body = fetch_body(
            &self.http,
            &url,
            &[
                ("name", name),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ],
            "geocoding",
        )
        .await?;

        let parsed: GeoResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::malformed("Failed to parse geocoding JSON", e))?;

        Ok(parsed.results)
    }
}
