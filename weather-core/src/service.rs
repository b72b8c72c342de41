//! Front door for views: city names and coordinates in, normalized weather out.

use anyhow::Context;
use async_trait::async_trait;

use crate::{
    Config,
    error::WeatherError,
    geocode::{AUTOCOMPLETE_LIMIT, Geocoder},
    model::{CityCandidate, Coordinates, CurrentConditions, ForecastDay},
    provider::{FORECAST_DAYS, WeatherProvider, build_http_client, provider_from_config},
};

/// Weather looked up by free-text city name.
///
/// Favorites refresh and the view feed go through this seam.
#[async_trait]
pub trait CityWeather: Send + Sync {
    async fn current_for_city(&self, city: &str) -> Result<CurrentConditions, WeatherError>;

    async fn forecast_for_city(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError>;
}

#[derive(Debug)]
pub struct WeatherService {
    geocoder: Geocoder,
    provider: Box<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(geocoder: Geocoder, provider: Box<dyn WeatherProvider>) -> Self {
        Self { geocoder, provider }
    }

    /// Service talking to the endpoints named in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_http_client().context("Failed to build HTTP client")?;
        let geocoder = Geocoder::new(config.endpoints.geocoding_url.clone(), http.clone());
        Ok(Self::new(geocoder, provider_from_config(config, http)))
    }

    /// Conditions for an anonymous point, e.g. a map click or geolocation fix.
    pub async fn current_at(&self, coords: Coordinates) -> Result<CurrentConditions, WeatherError> {
        self.provider.current(coords).await.inspect_err(|e| {
            tracing::error!(%coords, error = %e, "current conditions lookup failed");
        })
    }

    pub async fn search_cities(&self, query: &str) -> Result<Vec<CityCandidate>, WeatherError> {
        self.geocoder
            .search(query, AUTOCOMPLETE_LIMIT)
            .await
            .inspect_err(|e| tracing::error!(query, error = %e, "city search failed"))
    }
}

/// Coordinate lookups with the service's error logging.
#[async_trait]
impl WeatherProvider for WeatherService {
    async fn current(&self, coords: Coordinates) -> Result<CurrentConditions, WeatherError> {
        self.current_at(coords).await
    }

    async fn forecast(&self, coords: Coordinates, days: usize) -> Result<Vec<ForecastDay>, WeatherError> {
        self.provider
            .forecast(coords, days)
            .await
            .inspect_err(|e| tracing::error!(%coords, days, error = %e, "forecast lookup failed"))
    }
}

#[async_trait]
impl CityWeather for WeatherService {
    async fn current_for_city(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let result: Result<CurrentConditions, WeatherError> = async {
            let place = self.geocoder.resolve_place(city).await?;
            let mut current = self.provider.current(place.coordinates()).await?;
            current.city = place.name;
            current.country = place.country;
            Ok(current)
        }
        .await;

        result.inspect_err(|e| tracing::error!(city, error = %e, "current conditions lookup failed"))
    }

    async fn forecast_for_city(&self, city: &str) -> Result<Vec<ForecastDay>, WeatherError> {
        let result: Result<Vec<ForecastDay>, WeatherError> = async {
            let coords = self.geocoder.resolve(city).await?;
            self.provider.forecast(coords, FORECAST_DAYS).await
        }
        .await;

        result.inspect_err(|e| tracing::error!(city, error = %e, "forecast lookup failed"))
    }
}
