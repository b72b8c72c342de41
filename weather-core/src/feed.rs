//! Observable current/forecast state for the views.
//!
//! Views subscribe when they become active and drop the receiver when they
//! leave; there is no global state behind it.

use tokio::sync::watch;

use crate::{
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastDay},
    provider::{FORECAST_DAYS, WeatherProvider},
    service::CityWeather,
};

/// Both halves of a city load. Each settles on its own.
#[derive(Debug)]
pub struct CityLoad {
    pub current: Result<CurrentConditions, WeatherError>,
    pub forecast: Result<Vec<ForecastDay>, WeatherError>,
}

#[derive(Debug)]
pub struct WeatherFeed {
    current: watch::Sender<Option<CurrentConditions>>,
    forecast: watch::Sender<Vec<ForecastDay>>,
}

impl Default for WeatherFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherFeed {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        let (forecast, _) = watch::channel(Vec::new());
        Self { current, forecast }
    }

    pub fn subscribe_current(&self) -> watch::Receiver<Option<CurrentConditions>> {
        self.current.subscribe()
    }

    pub fn subscribe_forecast(&self) -> watch::Receiver<Vec<ForecastDay>> {
        self.forecast.subscribe()
    }

    /// Live subscriptions across both streams.
    pub fn subscriber_count(&self) -> usize {
        self.current.receiver_count() + self.forecast.receiver_count()
    }

    pub fn latest_current(&self) -> Option<CurrentConditions> {
        self.current.borrow().clone()
    }

    pub fn latest_forecast(&self) -> Vec<ForecastDay> {
        self.forecast.borrow().clone()
    }

    pub fn publish_current(&self, current: CurrentConditions) {
        self.current.send_replace(Some(current));
    }

    pub fn publish_forecast(&self, forecast: Vec<ForecastDay>) {
        self.forecast.send_replace(forecast);
    }

    /// Fetch current conditions and forecast for `city` concurrently.
    ///
    /// Each successful half is published as soon as both have settled; a
    /// failing half leaves its stream at the previous value.
    pub async fn load_city(&self, source: &dyn CityWeather, city: &str) -> CityLoad {
        let (current, forecast) = tokio::join!(source.current_for_city(city), source.forecast_for_city(city));
        self.settle(current, forecast)
    }

    /// Same as [`load_city`](Self::load_city) for an anonymous point, e.g. a geolocation fix.
    pub async fn load_at(&self, source: &dyn WeatherProvider, coords: Coordinates) -> CityLoad {
        let (current, forecast) = tokio::join!(source.current(coords), source.forecast(coords, FORECAST_DAYS));
        self.settle(current, forecast)
    }

    fn settle(
        &self,
        current: Result<CurrentConditions, WeatherError>,
        forecast: Result<Vec<ForecastDay>, WeatherError>,
    ) -> CityLoad {
        if let Ok(c) = &current {
            self.publish_current(c.clone());
        }
        if let Ok(f) = &forecast {
            self.publish_forecast(f.clone());
        }

        CityLoad { current, forecast }
    }
}
