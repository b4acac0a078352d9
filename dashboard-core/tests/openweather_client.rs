//! OpenWeatherClient against a mock HTTP server.

use weather_dashboard_core::{
    ApiError, LocationDescriptor, OpenWeatherClient, UnitSystem, WeatherApi, WeatherCategory,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::builder("TEST_KEY".to_string())
        .base_url(&server.uri())
        .build()
        .unwrap()
}

fn current_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "sys": {"country": "FR"},
        "main": {"temp": 21.3, "feels_like": 20.1, "humidity": 55},
        "wind": {"speed": 4.2},
        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}],
        "dt": 1714564800
    })
}

#[tokio::test]
async fn test_current_by_city_sends_query_and_units() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "imperial"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let current = client
        .current(&LocationDescriptor::city("Paris"), UnitSystem::Imperial)
        .await
        .unwrap();

    assert_eq!(current.location_name, "Paris");
    assert_eq!(current.country, "FR");
    assert_eq!(current.temperature, 21.3);
    assert_eq!(current.humidity_pct, 55);
    assert_eq!(current.category, WeatherCategory::Clear);
}

#[tokio::test]
async fn test_current_by_coords_sends_lat_lon() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lon", "2.35"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let current = client
        .current(&LocationDescriptor::coords(48.85, 2.35), UnitSystem::Metric)
        .await
        .unwrap();

    assert_eq!(current.location_name, "Paris");
}

#[tokio::test]
async fn test_current_404_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .current(&LocationDescriptor::city("Atlantis"), UnitSystem::Metric)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .forecast(&LocationDescriptor::city("Paris"), UnitSystem::Metric)
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid API key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .current(&LocationDescriptor::city("Paris"), UnitSystem::Metric)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_forecast_maps_list_and_timezone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": {"name": "Paris", "country": "FR", "timezone": 7200},
            "list": [
                {
                    "dt": 1714554000,
                    "main": {"temp": 15.0, "feels_like": 14.0, "humidity": 70},
                    "weather": [{"main": "Snow", "description": "light snow", "icon": "13d"}]
                },
                {
                    "dt": 1714564800,
                    "main": {"temp": 17.5, "feels_like": 16.0, "humidity": 60},
                    "weather": [{"main": "Thunderstorm", "description": "thunder", "icon": "11d"}]
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let feed = client
        .forecast(&LocationDescriptor::city("Paris"), UnitSystem::Metric)
        .await
        .unwrap();

    assert_eq!(feed.utc_offset_secs, Some(7200));
    assert_eq!(feed.samples.len(), 2);
    assert_eq!(feed.samples[0].timestamp, 1714554000);
    assert_eq!(feed.samples[0].category, WeatherCategory::Snow);
    assert_eq!(feed.samples[1].temperature, 17.5);
    assert_eq!(feed.samples[1].category, WeatherCategory::Thunder);
    assert_eq!(feed.samples[1].icon, "11d");
}
