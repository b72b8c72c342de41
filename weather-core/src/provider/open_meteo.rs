use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    codes::{self, format_clock, parse_local_timestamp, round_half_up, wind_direction},
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastDay},
};

use super::{WeatherProvider, fetch_body};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1";

const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,pressure_msl,wind_speed_10m,wind_direction_10m,visibility,uv_index";
const DAILY_FIELDS: &str = "sunrise,sunset,temperature_2m_max,temperature_2m_min,weather_code";
const FORECAST_DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code";

/// Visibility assumed when the provider leaves it out, in meters.
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn fetch(&self, query: &[(&str, &str)], what: &str) -> Result<OmResponse, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let body = fetch_body(&self.http, &url, query, what).await?;

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::malformed(&format!("Failed to parse {what} JSON"), e))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, coords: Coordinates) -> Result<CurrentConditions, WeatherError> {
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();

        tracing::debug!(%coords, "current conditions request");

        let parsed = self
            .fetch(
                &[
                    ("latitude", latitude.as_str()),
                    ("longitude", longitude.as_str()),
                    ("current_weather", "true"),
                    ("hourly", HOURLY_FIELDS),
                    ("daily", DAILY_FIELDS),
                    ("timezone", "auto"),
                ],
                "current weather",
            )
            .await?;

        normalize_current(parsed, coords)
    }

    async fn forecast(&self, coords: Coordinates, days: usize) -> Result<Vec<ForecastDay>, WeatherError> {
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();
        let forecast_days = days.to_string();

        tracing::debug!(%coords, days, "forecast request");

        let parsed = self
            .fetch(
                &[
                    ("latitude", latitude.as_str()),
                    ("longitude", longitude.as_str()),
                    ("daily", FORECAST_DAILY_FIELDS),
                    ("timezone", "auto"),
                    ("forecast_days", forecast_days.as_str()),
                ],
                "forecast",
            )
            .await?;

        let today = location_today(Utc::now(), parsed.utc_offset_seconds);
        normalize_forecast(parsed, days, today)
    }
}

#[derive(Debug, Deserialize)]
pub struct OmResponse {
    /// Offset of the location's local time; dates in `daily` are in that time.
    pub utc_offset_seconds: Option<i32>,
    pub current_weather: Option<OmCurrentWeather>,
    pub hourly: Option<OmHourly>,
    pub daily: Option<OmDaily>,
}

#[derive(Debug, Deserialize)]
pub struct OmCurrentWeather {
    pub time: String,
    pub temperature: f64,
    pub winddirection: f64,
    pub weathercode: i32,
}

/// Hourly series; every array is index-aligned with `time`.
#[derive(Debug, Deserialize)]
pub struct OmHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub pressure_msl: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub visibility: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct OmDaily {
    pub time: Vec<NaiveDate>,
    #[serde(default)]
    pub sunrise: Vec<String>,
    #[serde(default)]
    pub sunset: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<f64>,
    #[serde(default)]
    pub temperature_2m_min: Vec<f64>,
    #[serde(default)]
    pub weather_code: Vec<i32>,
}

/// Index of the hourly slot whose hour-of-day matches the observation time.
/// Falls back to 0 when nothing matches or the time cannot be read.
fn current_hour_index(observed: &str, hourly_times: &[String]) -> usize {
    let Some(hour) = parse_local_timestamp(observed).map(|ts| ts.hour()) else {
        tracing::debug!(observed, "unreadable observation time, using first hourly slot");
        return 0;
    };

    hourly_times
        .iter()
        .position(|t| parse_local_timestamp(t).map(|ts| ts.hour()) == Some(hour))
        .unwrap_or(0)
}

/// Calendar date at the forecast location. Without an offset the machine's
/// local date is used.
pub fn location_today(now: DateTime<Utc>, utc_offset_seconds: Option<i32>) -> NaiveDate {
    match utc_offset_seconds.and_then(FixedOffset::east_opt) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.with_timezone(&Local).date_naive(),
    }
}

fn slot(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

/// Map a current-conditions payload to [`CurrentConditions`] with empty city and country.
pub fn normalize_current(raw: OmResponse, coords: Coordinates) -> Result<CurrentConditions, WeatherError> {
    let current = raw
        .current_weather
        .ok_or_else(|| WeatherError::MalformedResponse("response has no current_weather".into()))?;
    let hourly = raw
        .hourly
        .ok_or_else(|| WeatherError::MalformedResponse("response has no hourly data".into()))?;
    let daily = raw
        .daily
        .ok_or_else(|| WeatherError::MalformedResponse("response has no daily data".into()))?;

    let sunrise = daily
        .sunrise
        .first()
        .and_then(|s| format_clock(s))
        .ok_or_else(|| WeatherError::MalformedResponse("daily sunrise missing or unreadable".into()))?;
    let sunset = daily
        .sunset
        .first()
        .and_then(|s| format_clock(s))
        .ok_or_else(|| WeatherError::MalformedResponse("daily sunset missing or unreadable".into()))?;

    let idx = current_hour_index(&current.time, &hourly.time);
    let visibility_m = round_half_up(slot(&hourly.visibility, idx).unwrap_or(DEFAULT_VISIBILITY_M));
    let temperature = round_half_up(current.temperature);

    Ok(CurrentConditions {
        city: String::new(),
        country: String::new(),
        temperature,
        feels_like: temperature,
        humidity: round_half_up(slot(&hourly.relative_humidity_2m, idx).unwrap_or(0.0)),
        pressure: round_half_up(slot(&hourly.pressure_msl, idx).unwrap_or(0.0)),
        wind_speed: round_half_up(slot(&hourly.wind_speed_10m, idx).unwrap_or(0.0)),
        wind_direction: wind_direction(current.winddirection),
        description: codes::description_for(current.weathercode).to_string(),
        icon: codes::icon_for(current.weathercode),
        visibility: visibility_m / 1000,
        uv_index: round_half_up(slot(&hourly.uv_index, idx).unwrap_or(0.0)),
        sunrise,
        sunset,
        coord: coords,
    })
}

/// Map a daily payload to exactly `days` entries, labelled relative to `today`.
pub fn normalize_forecast(raw: OmResponse, days: usize, today: NaiveDate) -> Result<Vec<ForecastDay>, WeatherError> {
    let daily = raw
        .daily
        .ok_or_else(|| WeatherError::MalformedResponse("response has no daily data".into()))?;

    let available = daily
        .time
        .len()
        .min(daily.temperature_2m_max.len())
        .min(daily.temperature_2m_min.len())
        .min(daily.weather_code.len());

    if available < days {
        return Err(WeatherError::MalformedResponse(format!(
            "expected {days} daily entries, got {available}"
        )));
    }

    let forecast = (0..days)
        .map(|i| {
            let date = daily.time[i];
            let code = daily.weather_code[i];
            ForecastDay {
                date,
                day: codes::day_label(date, today),
                high: round_half_up(daily.temperature_2m_max[i]),
                low: round_half_up(daily.temperature_2m_min[i]),
                icon: codes::icon_for(code),
                description: codes::description_for(code).to_string(),
            }
        })
        .collect();

    Ok(forecast)
}
