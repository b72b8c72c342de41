//! Human-readable rendering of weather data, honoring the unit settings.

use chrono::{DateTime, Utc};
use weather_core::{
    CityCandidate, Coordinates, CurrentConditions, FavoriteCity, ForecastDay,
    model::forecast_range,
    settings::{Settings, TemperatureBand},
};

fn band_label(celsius: i32) -> &'static str {
    match TemperatureBand::for_celsius(celsius) {
        TemperatureBand::Freezing => "freezing",
        TemperatureBand::Cold => "cold",
        TemperatureBand::Mild => "mild",
        TemperatureBand::Warm => "warm",
        TemperatureBand::Hot => "hot",
    }
}

pub fn current(c: &CurrentConditions, settings: &Settings) -> String {
    let t = settings.temperature_unit;
    let mut out = format!(
        "{}\n  {} ({}), {}\n",
        c.display_name(),
        t.format(c.temperature),
        band_label(c.temperature),
        c.description
    );
    out.push_str(&format!("  Feels like:  {}\n", t.format(c.feels_like)));
    out.push_str(&format!("  Humidity:    {}%\n", c.humidity));
    out.push_str(&format!("  Pressure:    {}\n", settings.pressure_unit.format(c.pressure)));
    out.push_str(&format!("  Wind:        {} {}\n", settings.wind_unit.format(c.wind_speed), c.wind_direction));
    out.push_str(&format!("  Visibility:  {} km\n", c.visibility));
    out.push_str(&format!("  UV index:    {}\n", c.uv_index));
    out.push_str(&format!("  Sunrise:     {}  Sunset: {}\n", c.sunrise, c.sunset));
    out.push_str(&format!("  Coordinates: {}\n", c.coord));
    out
}

pub fn forecast(days: &[ForecastDay], settings: &Settings) -> String {
    let t = settings.temperature_unit;
    let mut out = String::from("5-day forecast:\n");
    for day in days {
        out.push_str(&format!(
            "  {:<10} {}  {:>6} / {:<6} {}\n",
            day.day,
            day.date,
            t.format(day.high),
            t.format(day.low),
            day.description
        ));
    }
    if let Some((high, low)) = forecast_range(days) {
        out.push_str(&format!("  Range: {} .. {}\n", t.format(low), t.format(high)));
    }
    out
}

pub fn favorites(list: &[FavoriteCity], settings: &Settings, now: DateTime<Utc>) -> String {
    if list.is_empty() {
        return "No favorite cities yet. Add one with `weather favorites add <city>`.\n".to_string();
    }

    let mut out = String::new();
    for fav in list {
        out.push_str(&format!(
            "{:<28} {:>6}  {:<24} ({})\n",
            fav.id,
            settings.temperature_unit.format(fav.temperature),
            fav.description,
            fav.age_label(now)
        ));
    }
    out
}

pub fn map_view(center: Coordinates, zoom: u8) -> String {
    format!("Map centered at {center} (zoom {zoom})\n")
}

pub fn candidates(list: &[CityCandidate]) -> String {
    if list.is_empty() {
        return "No matching cities.\n".to_string();
    }
    list.iter()
        .map(|c| format!("{}  ({:.2}, {:.2})\n", c.label(), c.latitude, c.longitude))
        .collect()
}
