use std::{path::Path, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, Select, Text};
use weather_dashboard_core::{
    Config, Dashboard, DashboardSettings, DayBoundary, FetchOutcome, FileStore, KeyValueStore,
    LocationDescriptor, MemoryStore, PreferenceStore, Theme, UnitSystem, api_from_config,
    geolocator_from_config,
};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Current weather and a 5-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Metric,
    Imperial,
}

impl From<UnitArg> for UnitSystem {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Metric => UnitSystem::Metric,
            UnitArg::Imperial => UnitSystem::Imperial,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show the dashboard. Without arguments, shows the last search or the
    /// current position.
    Show {
        /// City name.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Switch units and refresh the last search.
    Units {
        #[arg(value_enum)]
        units: UnitArg,
    },

    /// Set the theme, or toggle it when no value is given.
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },

    /// Keep the dashboard open and search repeatedly.
    Interactive,
}

/// What `show` should display, decided from its arguments.
#[derive(Debug, Clone, PartialEq)]
enum ShowTarget {
    City(String),
    Coords(LocationDescriptor),
    /// The last search, or the current position when there is none.
    Remembered,
}

impl ShowTarget {
    fn from_args(city: Option<String>, lat: Option<f64>, lon: Option<f64>) -> Self {
        match (city, lat, lon) {
            (Some(city), _, _) => ShowTarget::City(city),
            (None, Some(lat), Some(lon)) => {
                ShowTarget::Coords(LocationDescriptor::coords(lat, lon))
            }
            _ => ShowTarget::Remembered,
        }
    }

    async fn load(self, dashboard: &Dashboard) -> Option<FetchOutcome> {
        match self {
            ShowTarget::City(city) => dashboard.search(&city).await,
            ShowTarget::Coords(loc) => {
                let units = dashboard.view().units;
                Some(dashboard.fetch_by_location(loc, units).await)
            }
            ShowTarget::Remembered => dashboard.mount().await,
        }
    }
}

/// Everything a dashboard command needs, built from config once.
pub struct App {
    pub dashboard: Dashboard,
    pub day_boundary: DayBoundary,
}

impl App {
    fn build(config: &Config) -> anyhow::Result<Self> {
        let api = api_from_config(config)?;
        let geolocator = geolocator_from_config(&config.geolocation);
        let prefs = open_preferences();
        let preferences = prefs.load(config.default_units);

        let dashboard = Dashboard::new(
            Arc::new(api),
            Arc::from(geolocator),
            prefs,
            preferences,
            DashboardSettings::from(config),
        );

        Ok(Self {
            dashboard,
            day_boundary: config.day_boundary,
        })
    }

    pub fn print(&self) {
        println!("{}", render::dashboard(&self.dashboard.view(), self.day_boundary));
    }
}

/// Preferences never block a command: without a usable file they live in
/// memory for this run.
fn open_preferences() -> PreferenceStore<Arc<dyn KeyValueStore>> {
    match Config::preferences_file_path() {
        Ok(path) => preferences_at(&path),
        Err(e) => {
            tracing::warn!("No preference location, keeping preferences in memory: {e:#}");
            PreferenceStore::new(Arc::new(MemoryStore::new()))
        }
    }
}

fn preferences_at(path: &Path) -> PreferenceStore<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match FileStore::open(path) {
        Ok(store) => {
            tracing::debug!(path = %path.display(), "opened preference store");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Failed to open preferences, keeping them in memory: {e}");
            Arc::new(MemoryStore::new())
        }
    };
    PreferenceStore::new(store)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show { city, lat, lon } => {
                let app = App::build(&config)?;
                println!("{}", render::loading_line());
                let target = ShowTarget::from_args(city, lat, lon);
                if let Some(Err(e)) = target.load(&app.dashboard).await {
                    tracing::debug!("show ended with an error: {e}");
                }
                app.print();
            }
            Command::Units { units } => {
                let app = App::build(&config)?;
                if app.dashboard.set_units(units.into()).await.is_none() {
                    // Nothing re-fetched; show whatever the stored search gives.
                    app.dashboard.mount().await;
                }
                app.print();
            }
            Command::Theme { theme } => {
                let prefs = open_preferences();
                let theme = theme.map(Theme::from).unwrap_or_else(|| prefs.theme().toggled());
                prefs.set_theme(theme)?;
                println!("Theme: {theme}");
            }
            Command::Interactive => {
                let app = App::build(&config)?;
                session::run(&app).await?;
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt aborted")?;
    config.set_api_key(api_key.trim().to_string());

    let choice = Select::new("Default units:", vec!["metric", "imperial"])
        .prompt()
        .context("Unit prompt aborted")?;
    config.default_units = UnitSystem::try_from(choice)?;

    let base_url = Text::new("API base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Base URL prompt aborted")?;
    config.base_url = base_url.trim().to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
