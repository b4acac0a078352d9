//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - Configuration and preference persistence
//! - The OpenWeather client and the geolocation capability
//! - Forecast reduction (one entry per day out of the 3-hour feed)
//! - The view state and the fetch cycle that updates it
//!
//! It is used by `weather-dashboard`, but has no terminal dependencies and can
//! back other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod store;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardSettings, FetchOutcome, Status, ViewState};
pub use error::{ApiError, FetchError, FetchStage, GeolocationError, StoreError};
pub use forecast::{DayBoundary, reduce, reduce_feed};
pub use geolocation::{Geolocator, geolocator_from_config, locate_within};
pub use model::{
    Coordinates, CurrentConditions, DailyForecast, ForecastFeed, ForecastSample,
    LocationDescriptor, Theme, UnitSystem, WeatherCategory,
};
pub use provider::{WeatherApi, api_from_config, openweather::OpenWeatherClient};
pub use store::{FileStore, KeyValueStore, MemoryStore, PreferenceStore, Preferences};
