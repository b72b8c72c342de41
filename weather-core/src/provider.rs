use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastDay},
    provider::open_meteo::OpenMeteoProvider,
};

pub mod open_meteo;

pub const USER_AGENT: &str = concat!("weather-dashboard/", env!("CARGO_PKG_VERSION"));
pub const FORECAST_DAYS: usize = 5;

/// Source of normalized weather for a pair of coordinates.
///
/// Results carry no city or country; naming the place is the caller's job.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, coords: Coordinates) -> Result<CurrentConditions, WeatherError>;

    async fn forecast(&self, coords: Coordinates, days: usize) -> Result<Vec<ForecastDay>, WeatherError>;
}

pub fn build_http_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Construct the forecast provider for the endpoints in `config`.
pub fn provider_from_config(config: &Config, http: Client) -> Box<dyn WeatherProvider> {
    Box::new(OpenMeteoProvider::new(config.endpoints.forecast_url.clone(), http))
}

/// GET `url` with `query` and return the body of a successful response.
pub(crate) async fn fetch_body(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
    what: &str,
) -> Result<String, WeatherError> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| WeatherError::transport(&format!("Failed to send {what} request"), e))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| WeatherError::transport(&format!("Failed to read {what} response body"), e))?;

    if !status.is_success() {
        return Err(WeatherError::Transport(format!(
            "{what} request failed with status {status}: {}",
            truncate_body(&body),
        )));
    }

    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "é".repeat(500);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn provider_from_default_config_builds() {
        let cfg = Config::default();
        let http = build_http_client().expect("client builds");
        let provider = provider_from_config(&cfg, http);
        assert!(format!("{provider:?}").contains("OpenMeteoProvider"));
    }
}
