use std::fmt;

/// Which of the two weather requests failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Current,
    Forecast,
}

impl FetchStage {
    pub fn failure_message(&self) -> &'static str {
        match self {
            FetchStage::Current => "Failed to fetch current weather",
            FetchStage::Forecast => "Failed to fetch forecast",
        }
    }
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchStage::Current => "current",
            FetchStage::Forecast => "forecast",
        })
    }
}

/// Failure of a fetch cycle as seen by the dashboard.
///
/// The `Display` output is the message shown in the error banner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("City not found")]
    NotFound,

    #[error("{}", .0.failure_message())]
    FetchFailed(FetchStage),

    #[error("Location unavailable")]
    GeolocationUnavailable,
}

/// Errors from the weather API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Location not found")]
    NotFound,

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from the geolocation capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl From<GeolocationError> for FetchError {
    fn from(_: GeolocationError) -> Self {
        FetchError::GeolocationUnavailable
    }
}

/// Errors from the key-value persistence capability.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not serialize value: {0}")]
    Encode(#[from] serde_json::Error),
}
