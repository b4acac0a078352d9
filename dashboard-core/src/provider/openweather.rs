use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::DEFAULT_BASE_URL,
    error::ApiError,
    model::{
        CurrentConditions, ForecastFeed, ForecastSample, LocationDescriptor, UnitSystem,
        WeatherCategory,
    },
};

use super::WeatherApi;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenWeatherClientBuilder {
    /// Point the client at another server, e.g. a mock in tests.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<OpenWeatherClient> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(OpenWeatherClient {
            api_key: self.api_key,
            base_url: self.base_url,
            http,
        })
    }
}

impl OpenWeatherClient {
    pub fn builder(api_key: String) -> OpenWeatherClientBuilder {
        OpenWeatherClientBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &LocationDescriptor,
        units: UnitSystem,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut query: Vec<(&str, String)> = match location {
            LocationDescriptor::City { name } => vec![("q", name.clone())],
            LocationDescriptor::Coords { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        query.push(("units", units.as_str().to_string()));
        query.push(("appid", self.api_key.clone()));

        tracing::debug!(%location, %units, endpoint, "requesting OpenWeather");

        let res = self.http.get(&url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

/// Category, icon and description from the first `weather` entry.
fn condition(weather: &[OwWeather]) -> (WeatherCategory, String, String) {
    match weather.first() {
        Some(w) => (WeatherCategory::from_label(&w.main), w.icon.clone(), w.description.clone()),
        None => (WeatherCategory::Other, String::new(), "Unknown".to_string()),
    }
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (category, icon, description) = condition(&parsed.weather);

        CurrentConditions {
            location_name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            category,
            icon,
            description,
        }
    }
}

impl From<OwForecastResponse> for ForecastFeed {
    fn from(parsed: OwForecastResponse) -> Self {
        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let (category, icon, description) = condition(&entry.weather);
                ForecastSample {
                    timestamp: entry.dt,
                    temperature: entry.main.temp,
                    category,
                    icon,
                    description,
                }
            })
            .collect();

        ForecastFeed {
            samples,
            utc_offset_secs: parsed.city.and_then(|c| c.timezone),
        }
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current(
        &self,
        location: &LocationDescriptor,
        units: UnitSystem,
    ) -> Result<CurrentConditions, ApiError> {
        let parsed: OwCurrentResponse = self.get_json("weather", location, units).await?;
        Ok(parsed.into())
    }

    async fn forecast(
        &self,
        location: &LocationDescriptor,
        units: UnitSystem,
    ) -> Result<ForecastFeed, ApiError> {
        let parsed: OwForecastResponse = self.get_json("forecast", location, units).await?;
        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
