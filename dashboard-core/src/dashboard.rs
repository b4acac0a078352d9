//! View state and the fetch cycle that feeds it.
//!
//! [`Dashboard`] is a cheap handle; clones share one [`ViewState`]. Every fetch
//! takes a ticket, and only the newest ticket may write to the view state, so
//! overlapping fetches resolve as "last request wins".

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{
    error::{ApiError, FetchError, FetchStage},
    forecast::{DayBoundary, reduce_feed},
    geolocation::{Geolocator, locate_within},
    model::{Coordinates, CurrentConditions, DailyForecast, LocationDescriptor, Theme, UnitSystem},
    provider::WeatherApi,
    store::{KeyValueStore, PreferenceStore, Preferences},
};

pub type FetchOutcome = Result<(CurrentConditions, DailyForecast), FetchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing chosen yet.
    Idle,
    Loading,
    Ready,
    /// An error message is set; earlier data may still be shown.
    Errored,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub current: Option<CurrentConditions>,
    pub forecast: DailyForecast,
    /// UTC offset of the forecast location, as reported with the last forecast.
    pub forecast_utc_offset: Option<i32>,
    pub loading: bool,
    pub error: Option<String>,
    pub units: UnitSystem,
    pub theme: Theme,
    pub last_search: Option<LocationDescriptor>,
}

impl ViewState {
    fn from_preferences(prefs: Preferences) -> Self {
        Self {
            units: prefs.units,
            theme: prefs.theme,
            last_search: prefs.last_search,
            ..Self::default()
        }
    }

    pub fn status(&self) -> Status {
        if self.loading {
            Status::Loading
        } else if self.error.is_some() {
            Status::Errored
        } else if self.current.is_some() {
            Status::Ready
        } else {
            Status::Idle
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DashboardSettings {
    pub geolocation_timeout: Duration,
    pub day_boundary: DayBoundary,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            geolocation_timeout: Duration::from_secs(8),
            day_boundary: DayBoundary::Viewer,
        }
    }
}

impl From<&crate::Config> for DashboardSettings {
    fn from(config: &crate::Config) -> Self {
        Self {
            geolocation_timeout: config.geolocation_timeout(),
            day_boundary: config.day_boundary,
        }
    }
}

struct Shared {
    view: ViewState,
    /// Ticket of the most recently started fetch.
    latest: u64,
}

struct Inner {
    api: Arc<dyn WeatherApi>,
    geolocator: Arc<dyn Geolocator>,
    prefs: PreferenceStore<Arc<dyn KeyValueStore>>,
    settings: DashboardSettings,
    shared: Mutex<Shared>,
}

#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    /// `preferences` is the snapshot loaded at startup; later writes go
    /// through `prefs`.
    pub fn new(
        api: Arc<dyn WeatherApi>,
        geolocator: Arc<dyn Geolocator>,
        prefs: PreferenceStore<Arc<dyn KeyValueStore>>,
        preferences: Preferences,
        settings: DashboardSettings,
    ) -> Self {
        let shared = Shared {
            view: ViewState::from_preferences(preferences),
            latest: 0,
        };

        Self {
            inner: Arc::new(Inner {
                api,
                geolocator,
                prefs,
                settings,
                shared: Mutex::new(shared),
            }),
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.inner.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current view state.
    pub fn view(&self) -> ViewState {
        self.shared().view.clone()
    }

    /// First load: the persisted last search, else the device position.
    ///
    /// Returns `None` when nothing was fetched (no last search and no
    /// position), leaving the dashboard idle.
    pub async fn mount(&self) -> Option<FetchOutcome> {
        let (last_search, units) = {
            let shared = self.shared();
            (shared.view.last_search.clone(), shared.view.units)
        };

        if let Some(loc) = last_search {
            tracing::debug!(%loc, "restoring last search");
            return Some(self.fetch_by_location(loc, units).await);
        }

        match self.locate().await {
            Ok(coords) => Some(self.fetch_by_location(coords.into(), units).await),
            // Not shown to the user; the dashboard just waits for a search.
            Err(_) => None,
        }
    }

    /// Device position, bounded by the configured geolocation timeout.
    pub async fn locate(&self) -> Result<Coordinates, FetchError> {
        let timeout = self.inner.settings.geolocation_timeout;
        locate_within(self.inner.geolocator.as_ref(), timeout).await.map_err(|e| {
            tracing::warn!("Geolocation unavailable: {e}");
            FetchError::from(e)
        })
    }

    /// Search by city name. Blank input is ignored.
    pub async fn search(&self, city: &str) -> Option<FetchOutcome> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }

        let units = self.shared().view.units;
        Some(self.fetch_by_location(LocationDescriptor::city(city), units).await)
    }

    /// Switch units and re-fetch the last search with them.
    ///
    /// Returns `None` when the unit did not change or nothing was searched yet.
    pub async fn set_units(&self, units: UnitSystem) -> Option<FetchOutcome> {
        let last_search = {
            let mut shared = self.shared();
            if shared.view.units == units {
                return None;
            }
            shared.view.units = units;
            shared.view.last_search.clone()
        };

        if let Err(e) = self.inner.prefs.set_units(units) {
            tracing::warn!("Failed to persist unit preference: {e}");
        }

        let loc = last_search?;
        Some(self.fetch_by_location(loc, units).await)
    }

    pub fn set_theme(&self, theme: Theme) {
        self.shared().view.theme = theme;
        if let Err(e) = self.inner.prefs.set_theme(theme) {
            tracing::warn!("Failed to persist theme preference: {e}");
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.shared().view.theme.toggled();
        self.set_theme(theme);
        theme
    }

    /// Fetch current conditions, then the forecast, for `loc`.
    ///
    /// Current conditions are shown as soon as they arrive, even if the
    /// forecast request then fails. The error message, the loading flag and the
    /// persisted last search are only touched while this is the newest fetch.
    pub async fn fetch_by_location(
        &self,
        loc: LocationDescriptor,
        units: UnitSystem,
    ) -> FetchOutcome {
        let ticket = {
            let mut shared = self.shared();
            shared.latest += 1;
            shared.view.loading = true;
            shared.view.error = None;
            shared.latest
        };

        let outcome = self.run_fetch(ticket, &loc, units).await;

        let applied = self.apply(ticket, |view| {
            view.loading = false;
            if let Err(e) = &outcome {
                view.error = Some(e.to_string());
            }
        });

        if !applied {
            tracing::debug!(%loc, ticket, "discarding result of superseded fetch");
        }

        outcome
    }

    async fn run_fetch(
        &self,
        ticket: u64,
        loc: &LocationDescriptor,
        units: UnitSystem,
    ) -> FetchOutcome {
        let api = &self.inner.api;

        let current = api
            .current(loc, units)
            .await
            .map_err(|e| classify(FetchStage::Current, loc, e))?;

        self.apply(ticket, |view| view.current = Some(current.clone()));

        let feed = api
            .forecast(loc, units)
            .await
            .map_err(|e| classify(FetchStage::Forecast, loc, e))?;

        let daily = reduce_feed(&feed, self.inner.settings.day_boundary);

        // Persisted under the state lock: the stored last search always
        // belongs to the newest fetch.
        let applied = self.apply(ticket, |view| {
            view.forecast = daily.clone();
            view.forecast_utc_offset = feed.utc_offset_secs;
            view.last_search = Some(loc.clone());

            if let Err(e) = self.inner.prefs.set_last_search(loc) {
                tracing::warn!("Failed to persist last search: {e}");
            }
        });

        if applied {
            tracing::info!(%loc, %units, days = daily.len(), "weather updated");
        }

        Ok((current, daily))
    }

    /// Run `update` on the view state if `ticket` is still the newest fetch.
    fn apply(&self, ticket: u64, update: impl FnOnce(&mut ViewState)) -> bool {
        let mut shared = self.shared();
        if shared.latest != ticket {
            return false;
        }
        update(&mut shared.view);
        true
    }
}

fn classify(stage: FetchStage, loc: &LocationDescriptor, err: ApiError) -> FetchError {
    tracing::warn!(%loc, %stage, "weather request failed: {err}");

    match (stage, err) {
        (FetchStage::Current, ApiError::NotFound) if loc.is_city() => FetchError::NotFound,
        _ => FetchError::FetchFailed(stage),
    }
}
