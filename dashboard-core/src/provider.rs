use crate::{
    Config,
    error::ApiError,
    model::{CurrentConditions, ForecastFeed, LocationDescriptor, UnitSystem},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The two read-only endpoints the dashboard needs.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn current(
        &self,
        location: &LocationDescriptor,
        units: UnitSystem,
    ) -> Result<CurrentConditions, ApiError>;

    async fn forecast(
        &self,
        location: &LocationDescriptor,
        units: UnitSystem,
    ) -> Result<ForecastFeed, ApiError>;
}

/// Construct the OpenWeather client from config.
pub fn api_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.resolve_api_key()?;
    OpenWeatherClient::builder(api_key)
        .base_url(&config.base_url)
        .timeout(config.request_timeout())
        .build()
}
