//! Full fetch cycles: Dashboard + OpenWeatherClient + mock server.

use std::{sync::Arc, time::Duration};

use weather_dashboard_core::{
    Dashboard, DashboardSettings, DayBoundary, FetchError, FetchStage, KeyValueStore,
    LocationDescriptor, MemoryStore, OpenWeatherClient, PreferenceStore, Status, UnitSystem,
    geolocation::DisabledGeolocator, store::LAST_SEARCH_KEY,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(name: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "sys": {"country": "FR"},
        "main": {"temp": temp, "feels_like": temp, "humidity": 40},
        "wind": {"speed": 2.0},
        "weather": [{"main": "Rain", "description": "moderate rain", "icon": "10d"}]
    })
}

/// Three days of 3-hour samples starting 2024-05-01 00:00 UTC.
fn forecast_body() -> serde_json::Value {
    let start = 1714521600_i64;
    let list: Vec<_> = (0..24)
        .map(|i| {
            serde_json::json!({
                "dt": start + i * 3 * 3600,
                "main": {"temp": i as f64},
                "weather": [{"main": "Clouds", "description": format!("slot {i}"), "icon": "03d"}]
            })
        })
        .collect();

    serde_json::json!({"city": {"name": "Paris", "country": "FR", "timezone": 0}, "list": list})
}

fn dashboard_for(server: &MockServer, store: Arc<MemoryStore>) -> Dashboard {
    let api = OpenWeatherClient::builder("KEY".to_string())
        .base_url(&server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let kv: Arc<dyn KeyValueStore> = store;
    let prefs = PreferenceStore::new(kv);
    let preferences = prefs.load(UnitSystem::Metric);
    let settings = DashboardSettings {
        geolocation_timeout: Duration::from_millis(100),
        day_boundary: DayBoundary::Location,
    };

    Dashboard::new(Arc::new(api), Arc::new(DisabledGeolocator), prefs, preferences, settings)
}

#[tokio::test]
async fn test_search_reduces_forecast_to_noon_samples() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 18.0)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let dashboard = dashboard_for(&mock_server, Arc::new(MemoryStore::new()));
    dashboard.search("Paris").await.unwrap().unwrap();

    let view = dashboard.view();
    assert_eq!(view.status(), Status::Ready);
    let picked: Vec<_> = view.forecast.iter().map(|s| s.description.as_str()).collect();
    // Slot 4 is 12:00 on day one, then every 8 slots.
    assert_eq!(picked, vec!["slot 4", "slot 12", "slot 20"]);
}

#[tokio::test]
async fn test_unit_toggle_reissues_both_requests_in_imperial() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 64.0)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(LAST_SEARCH_KEY, r#"{"type":"city","city":"Paris"}"#).unwrap();
    let dashboard = dashboard_for(&mock_server, store.clone());

    dashboard.set_units(UnitSystem::Imperial).await.unwrap().unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(dashboard.view().current.unwrap().temperature, 64.0);

    let stored: LocationDescriptor =
        serde_json::from_str(&store.get(LAST_SEARCH_KEY).unwrap()).unwrap();
    assert_eq!(stored, LocationDescriptor::city("Paris"));
}

#[tokio::test]
async fn test_city_not_found_sets_banner_and_skips_forecast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dashboard = dashboard_for(&mock_server, Arc::new(MemoryStore::new()));
    let err = dashboard.search("Atlantis").await.unwrap().unwrap_err();

    assert_eq!(err, FetchError::NotFound);
    let view = dashboard.view();
    assert!(!view.loading);
    assert_eq!(view.error.as_deref(), Some("City not found"));
    assert!(view.current.is_none());
}

#[tokio::test]
async fn test_forecast_failure_surfaces_partial_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Lyon", 22.0)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let dashboard = dashboard_for(&mock_server, store.clone());
    let err = dashboard.search("Lyon").await.unwrap().unwrap_err();

    assert_eq!(err, FetchError::FetchFailed(FetchStage::Forecast));
    let view = dashboard.view();
    assert_eq!(view.status(), Status::Errored);
    assert_eq!(view.current.unwrap().location_name, "Lyon");
    assert!(view.forecast.is_empty());
    assert!(store.get(LAST_SEARCH_KEY).is_none());
}
