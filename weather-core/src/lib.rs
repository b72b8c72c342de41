//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Geocoding and Open-Meteo forecast lookups, normalized into stable shapes
//! - Local preference storage (favorites, search history, settings, notification opt-in)
//! - Favorites management with isolated per-city refresh
//! - An observable feed the views subscribe to
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod codes;
pub mod config;
pub mod error;
pub mod favorites;
pub mod feed;
pub mod geocode;
pub mod history;
pub mod location;
pub mod map;
pub mod model;
pub mod notify;
pub mod provider;
pub mod service;
pub mod settings;
pub mod store;

pub use config::{Config, Endpoints};
pub use error::{LocationError, WeatherError};
pub use favorites::{AddOutcome, FavoritesManager, RefreshError, RefreshReport};
pub use feed::{CityLoad, WeatherFeed};
pub use geocode::Geocoder;
pub use history::SearchHistory;
pub use model::{CityCandidate, Coordinates, CurrentConditions, FavoriteCity, ForecastDay};
pub use provider::WeatherProvider;
pub use service::{CityWeather, WeatherService};
pub use settings::Settings;
pub use store::PreferenceStore;
