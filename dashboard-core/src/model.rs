use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a weather lookup is parameterized by.
///
/// Serialized as `{"type":"city","city":"Paris"}` or
/// `{"type":"coords","lat":48.85,"lon":2.35}`, which is also the persisted form
/// of the last search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LocationDescriptor {
    City {
        #[serde(rename = "city")]
        name: String,
    },
    Coords {
        lat: f64,
        lon: f64,
    },
}

impl LocationDescriptor {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City { name: name.into() }
    }

    pub fn coords(lat: f64, lon: f64) -> Self {
        Self::Coords { lat, lon }
    }

    pub fn is_city(&self) -> bool {
        matches!(self, Self::City { .. })
    }
}

impl fmt::Display for LocationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City { name } => f.write_str(name),
            Self::Coords { lat, lon } => write!(f, "{lat:.4},{lon:.4}"),
        }
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinates> for LocationDescriptor {
    fn from(c: Coordinates) -> Self {
        LocationDescriptor::Coords {
            lat: c.lat,
            lon: c.lon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl TryFrom<&str> for Theme {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported: light, dark.")),
        }
    }
}

/// Coarse classification of the API condition label, used for backdrop theming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunder,
    #[default]
    Other,
}

impl WeatherCategory {
    /// Classify a condition label such as "Clouds" or "Thunderstorm".
    ///
    /// Checks run in a fixed order and the first substring hit wins, so
    /// "Thunderstorm with rain" is `Rain`.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();

        if label.contains("cloud") {
            Self::Clouds
        } else if label.contains("rain") || label.contains("drizzle") {
            Self::Rain
        } else if label.contains("snow") {
            Self::Snow
        } else if label.contains("clear") {
            Self::Clear
        } else if label.contains("thunder") {
            Self::Thunder
        } else {
            Self::Other
        }
    }

    pub fn backdrop(&self) -> &'static str {
        match self {
            Self::Clear => "bg-clear",
            Self::Clouds => "bg-clouds",
            Self::Rain => "bg-rain",
            Self::Snow => "bg-snow",
            Self::Thunder => "bg-thunder",
            Self::Other => "bg-default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub category: WeatherCategory,
    pub icon: String,
    pub description: String,
}

/// One entry of the 3-hour forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub temperature: f64,
    pub category: WeatherCategory,
    pub icon: String,
    pub description: String,
}

impl ForecastSample {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Raw forecast feed as returned by the API.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastFeed {
    pub samples: Vec<ForecastSample>,
    /// Offset of the forecast location from UTC, when the API reports it.
    pub utc_offset_secs: Option<i32>,
}

/// One representative sample per calendar day, at most five.
pub type DailyForecast = Vec<ForecastSample>;
