//! Position acquisition for the first launch, before anything was searched.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::{GeolocationConfig, GeolocationMode},
    error::GeolocationError,
    model::Coordinates,
};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Run `geolocator`, giving up after `timeout`.
pub async fn locate_within(
    geolocator: &dyn Geolocator,
    timeout: Duration,
) -> Result<Coordinates, GeolocationError> {
    match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout),
    }
}

/// Build the geolocator selected in config.
pub fn geolocator_from_config(config: &GeolocationConfig) -> Box<dyn Geolocator> {
    match config.mode {
        GeolocationMode::Ip => Box::new(IpGeolocator::new(&config.endpoint)),
        GeolocationMode::Fixed => match (config.lat, config.lon) {
            (Some(lat), Some(lon)) => Box::new(FixedGeolocator::new(Coordinates { lat, lon })),
            _ => {
                tracing::warn!("Fixed geolocation selected without lat/lon; location disabled");
                Box::new(DisabledGeolocator)
            }
        },
        GeolocationMode::Disabled => Box::new(DisabledGeolocator),
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| GeolocationError::Other(e.to_string()))?;

        if !res.status().is_success() {
            tracing::debug!("IP geolocation returned status {}", res.status());
            return Err(GeolocationError::Unavailable);
        }

        let body: IpApiResponse =
            res.json().await.map_err(|e| GeolocationError::Other(e.to_string()))?;

        if body.status.as_deref().is_some_and(|s| s != "success") {
            return Err(GeolocationError::Other(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates { lat, lon }),
            _ => Err(GeolocationError::Unavailable),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    coords: Coordinates,
}

impl FixedGeolocator {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.coords)
    }
}

/// Location access turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeolocator;

#[async_trait]
impl Geolocator for DisabledGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}
