//! Integration tests for geocoding and forecast lookups against a mock Open-Meteo server.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, Utc};
use serde_json::{Value, json};
use weather_core::{
    CityWeather, FavoriteCity, FavoritesManager, Geocoder, PreferenceStore, WeatherError, WeatherService,
    codes::{Compass, WeatherIcon},
    provider::{
        build_http_client,
        open_meteo::{OpenMeteoProvider, location_today},
    },
    store::keys,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> WeatherService {
    let http = build_http_client().unwrap();
    let geocoder = Geocoder::new(format!("{}/geo", server.uri()), http.clone());
    let provider = OpenMeteoProvider::new(format!("{}/wx", server.uri()), http);
    WeatherService::new(geocoder, Box::new(provider))
}

fn place(name: &str, country: &str, lat: f64, lon: f64) -> Value {
    json!({ "name": name, "country": country, "admin1": name, "latitude": lat, "longitude": lon })
}

async fn mount_place(server: &MockServer, query: &str, result: Value) {
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("name", query))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [result] })))
        .mount(server)
        .await;
}

fn current_payload(temperature: f64, weathercode: i32) -> Value {
    let times: Vec<String> = (0..24).map(|h| format!("2024-05-06T{h:02}:00")).collect();
    json!({
        "current_weather": {
            "time": "2024-05-06T09:00",
            "temperature": temperature,
            "windspeed": 14.0,
            "winddirection": 92.0,
            "weathercode": weathercode
        },
        "hourly": {
            "time": times,
            "relative_humidity_2m": vec![71.0; 24],
            "pressure_msl": vec![1008.4; 24],
            "wind_speed_10m": vec![14.2; 24],
            "visibility": vec![18000.0; 24],
            "uv_index": vec![2.4; 24]
        },
        "daily": {
            "time": ["2024-05-06"],
            "sunrise": ["2024-05-06T04:58"],
            "sunset": ["2024-05-06T20:14"],
            "temperature_2m_max": [17.0],
            "temperature_2m_min": [8.0],
            "weather_code": [weathercode]
        }
    })
}

async fn mount_current(server: &MockServer, latitude: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/wx/forecast"))
        .and(query_param("latitude", latitude))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolve_returns_first_match() {
    let server = MockServer::start().await;
    mount_place(&server, "Kyiv", place("Kyiv", "Ukraine", 50.45, 30.52)).await;

    let http = build_http_client().unwrap();
    let geocoder = Geocoder::new(format!("{}/geo/", server.uri()), http);
    let coords = geocoder.resolve("Kyiv").await.unwrap();

    assert_eq!(coords.latitude, 50.45);
    assert_eq!(coords.longitude, 30.52);
}

#[tokio::test]
async fn resolve_without_results_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.5 })))
        .mount(&server)
        .await;

    let err = service_for(&server).current_for_city("Atlantis").await.unwrap_err();
    assert_eq!(err, WeatherError::NotFound("Atlantis".into()));
}

#[tokio::test]
async fn search_with_no_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("count", "5"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let results = service_for(&server).search_cities("zzzz").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_returns_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("name", "Spring"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                place("Springfield", "United States", 39.8, -89.6),
                { "name": "Springs", "latitude": -26.25, "longitude": 28.4 }
            ]
        })))
        .mount(&server)
        .await;

    let results = service_for(&server).search_cities("Spring").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label(), "Springfield, United States");
    assert_eq!(results[1].country, "");
}

#[tokio::test]
async fn geocoding_http_failure_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = service_for(&server).search_cities("Kyiv").await.unwrap_err();

    match err {
        WeatherError::Transport(msg) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_transport() {
    let http = build_http_client().unwrap();
    let geocoder = Geocoder::new("http://127.0.0.1:9", http);

    let err = geocoder.resolve("Kyiv").await.unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn current_for_city_is_normalized_and_named() {
    let server = MockServer::start().await;
    mount_place(&server, "Kyiv", place("Kyiv", "Ukraine", 50.45, 30.52)).await;
    mount_current(&server, "50.45", current_payload(16.5, 3)).await;

    let current = service_for(&server).current_for_city("Kyiv").await.unwrap();

    assert_eq!(current.city, "Kyiv");
    assert_eq!(current.country, "Ukraine");
    assert_eq!(current.display_name(), "Kyiv, Ukraine");
    assert_eq!(current.temperature, 17);
    assert_eq!(current.humidity, 71);
    assert_eq!(current.pressure, 1008);
    assert_eq!(current.wind_speed, 14);
    assert_eq!(current.wind_direction, Compass::East);
    assert_eq!(current.visibility, 18);
    assert_eq!(current.uv_index, 2);
    assert_eq!(current.icon, WeatherIcon::Overcast);
    assert_eq!(current.sunrise, "04:58");
    assert_eq!(current.coord.latitude, 50.45);
}

#[tokio::test]
async fn coordinate_lookup_is_anonymous() {
    let server = MockServer::start().await;
    mount_current(&server, "48.2", current_payload(-0.5, 71)).await;

    let current = service_for(&server)
        .current_at(weather_core::Coordinates::new(48.2, 16.37))
        .await
        .unwrap();

    assert_eq!(current.city, "");
    assert_eq!(current.display_name(), "Current Location");
    assert_eq!(current.temperature, 0);
    assert_eq!(current.description, "Slight snow fall");
}

#[tokio::test]
async fn missing_arrays_are_malformed() {
    let server = MockServer::start().await;
    mount_place(&server, "Kyiv", place("Kyiv", "Ukraine", 50.45, 30.52)).await;
    let mut body = current_payload(10.0, 0);
    body.as_object_mut().unwrap().remove("hourly");
    mount_current(&server, "50.45", body).await;

    let err = service_for(&server).current_for_city("Kyiv").await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = service_for(&server).search_cities("Kyiv").await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn forecast_for_city_has_five_labelled_days() {
    let server = MockServer::start().await;
    mount_place(&server, "Kyiv", place("Kyiv", "Ukraine", 50.45, 30.52)).await;

    let today = Local::now().date_naive();
    let dates: Vec<String> = today.iter_days().take(5).map(|d| d.to_string()).collect();
    Mock::given(method("GET"))
        .and(path("/wx/forecast"))
        .and(query_param("forecast_days", "5"))
        .and(query_param("daily", "temperature_2m_max,temperature_2m_min,weather_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "daily": {
                "time": dates,
                "temperature_2m_max": [20.2, 21.6, 19.0, 18.4, 22.5],
                "temperature_2m_min": [10.0, 11.0, 9.4, 8.5, 12.1],
                "weather_code": [0, 2, 61, 95, 42]
            }
        })))
        .mount(&server)
        .await;

    let days = service_for(&server).forecast_for_city("Kyiv").await.unwrap();

    assert_eq!(days.len(), 5);
    assert_eq!(days[0].day, "Today");
    assert_eq!(days[1].day, "Tomorrow");
    for (offset, day) in days.iter().enumerate().skip(2) {
        let date: NaiveDate = today + chrono::Days::new(offset as u64);
        assert_eq!(day.date, date);
        assert_eq!(day.day, date.format("%A").to_string());
        assert_eq!(date.weekday(), day.date.weekday());
    }
    assert_eq!(days.iter().map(|d| d.high).collect::<Vec<_>>(), [20, 22, 19, 18, 23]);
    assert_eq!(days[3].icon, WeatherIcon::Thunderstorm);
    assert_eq!(days[4].description, "Unknown");
    assert_eq!(days[4].icon, WeatherIcon::GenericCloudy);
}

#[tokio::test]
async fn forecast_labels_use_the_city_local_date() {
    let server = MockServer::start().await;
    mount_place(&server, "Kiritimati", place("Kiritimati", "Kiribati", 1.87, -157.4)).await;

    // UTC+14: usually a day ahead of the machine running the tests.
    let offset = 14 * 3600;
    let today_there = location_today(Utc::now(), Some(offset));
    let dates: Vec<String> = today_there.iter_days().take(5).map(|d| d.to_string()).collect();
    Mock::given(method("GET"))
        .and(path("/wx/forecast"))
        .and(query_param("forecast_days", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "utc_offset_seconds": offset,
            "daily": {
                "time": dates,
                "temperature_2m_max": [30.0, 30.0, 30.0, 30.0, 30.0],
                "temperature_2m_min": [25.0, 25.0, 25.0, 25.0, 25.0],
                "weather_code": [1, 1, 1, 1, 1]
            }
        })))
        .mount(&server)
        .await;

    let days = service_for(&server).forecast_for_city("Kiritimati").await.unwrap();

    assert_eq!(days[0].date, today_there);
    assert_eq!(days[0].day, "Today");
    assert_eq!(days[1].day, "Tomorrow");
}

fn favorite(name: &str, country: &str, temperature: i32) -> FavoriteCity {
    FavoriteCity {
        id: FavoriteCity::id_for(name, country),
        name: name.into(),
        country: country.into(),
        temperature,
        description: "Clear sky".into(),
        icon: WeatherIcon::Sunny,
        last_updated: chrono::Utc::now() - chrono::Duration::hours(3),
    }
}

#[tokio::test]
async fn refresh_all_keeps_going_past_a_failing_city() {
    let server = MockServer::start().await;
    mount_place(&server, "Oslo, Norway", place("Oslo", "Norway", 59.91, 10.75)).await;
    mount_place(&server, "Cairo, Egypt", place("Cairo", "Egypt", 30.06, 31.25)).await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("name", "Lima, Peru"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_current(&server, "59.91", current_payload(-2.0, 73)).await;
    mount_current(&server, "30.06", current_payload(33.0, 0)).await;

    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::open(dir.path().join("preferences.json"));
    store.set_json(
        keys::FAVORITE_CITIES,
        &[favorite("Oslo", "Norway", 5), favorite("Lima", "Peru", 19), favorite("Cairo", "Egypt", 28)],
    );

    let mut favorites = FavoritesManager::load(store);
    let source: Arc<dyn CityWeather> = Arc::new(service_for(&server));
    let report = favorites.refresh_all(source).await;

    assert_eq!(report.updated.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "Lima-Peru");
    assert!(matches!(report.failures[0].1, WeatherError::Transport(_)));

    let list = favorites.list();
    assert_eq!(list[0].temperature, -2);
    assert_eq!(list[0].description, "Moderate snow fall");
    assert_eq!(list[1].temperature, 19);
    assert_eq!(list[1].description, "Clear sky");
    assert_eq!(list[2].temperature, 33);
}
