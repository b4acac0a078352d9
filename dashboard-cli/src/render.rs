//! Text rendering of the dashboard. No decisions are made here beyond layout.

use std::fmt::Write;

use chrono::{FixedOffset, Local, TimeZone};
use weather_dashboard_core::{
    CurrentConditions, DayBoundary, ForecastSample, Theme, UnitSystem, ViewState,
};

const EMPTY_HINT: &str = "No weather data yet. Search a city or allow location access.";

/// Round half up, so -2.5 shows as -2.
fn rounded(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn header(units: UnitSystem, theme: Theme) -> String {
    let button = |u: UnitSystem, label: &str| {
        if u == units {
            format!("[{label}]")
        } else {
            format!(" {label} ")
        }
    };
    // The toggle shows the theme it switches to.
    let theme_button = match theme {
        Theme::Dark => "☀️ Light",
        Theme::Light => "🌙 Dark",
    };

    format!(
        "Weather App · Fast forecasts at a glance\n{}{}   {}",
        button(UnitSystem::Metric, "°C"),
        button(UnitSystem::Imperial, "°F"),
        theme_button,
    )
}

pub fn loading_line() -> &'static str {
    "Loading…"
}

pub fn current_panel(current: &CurrentConditions, units: UnitSystem) -> String {
    let temp = units.temperature_suffix();
    let mut out = String::new();

    let _ = writeln!(out, "{}, {}", current.location_name, current.country);
    let _ = writeln!(out, "  {}{temp}  {}", rounded(current.temperature), current.description);
    let _ = writeln!(out, "  Feels like: {}{temp}", rounded(current.feels_like));
    let _ = writeln!(out, "  Humidity: {}%", current.humidity_pct);
    let _ = write!(out, "  Wind: {} {}", rounded(current.wind_speed), units.speed_suffix());
    out
}

pub fn forecast_card<Tz: TimeZone>(sample: &ForecastSample, units: UnitSystem, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = sample
        .time()
        .map(|utc| utc.with_timezone(zone).format("%a, %b %-d").to_string())
        .unwrap_or_else(|| "?".to_string());

    format!(
        "{day:<12} {:<20} {}{}",
        sample.description,
        rounded(sample.temperature),
        units.temperature_suffix()
    )
}

fn forecast_lines(view: &ViewState, boundary: DayBoundary) -> Vec<String> {
    let location_zone = match boundary {
        DayBoundary::Location => view.forecast_utc_offset.and_then(FixedOffset::east_opt),
        DayBoundary::Viewer => None,
    };

    view.forecast
        .iter()
        .map(|sample| match &location_zone {
            Some(offset) => forecast_card(sample, view.units, offset),
            None => forecast_card(sample, view.units, &Local),
        })
        .collect()
}

/// Whole dashboard for one view-state snapshot.
pub fn dashboard(view: &ViewState, boundary: DayBoundary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", header(view.units, view.theme));
    if let Some(current) = &view.current {
        let _ = writeln!(out, "backdrop: {}", current.category.backdrop());
    }
    let _ = writeln!(out);

    if view.loading {
        let _ = writeln!(out, "{}", loading_line());
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {error}");
    }

    match &view.current {
        Some(current) => {
            let _ = writeln!(out, "{}", current_panel(current, view.units));
        }
        None => {
            let _ = writeln!(out, "{EMPTY_HINT}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "5 day forecast");
    let lines = forecast_lines(view, boundary);
    if lines.is_empty() {
        let _ = writeln!(out, "  Forecast unavailable");
    }
    for line in lines {
        let _ = writeln!(out, "  {line}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weather_dashboard_core::WeatherCategory;

    fn paris() -> CurrentConditions {
        CurrentConditions {
            location_name: "Paris".into(),
            country: "FR".into(),
            temperature: 18.5,
            feels_like: 17.2,
            humidity_pct: 64,
            wind_speed: 3.4,
            category: WeatherCategory::Rain,
            icon: "10d".into(),
            description: "light rain".into(),
        }
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(rounded(18.5), 19);
        assert_eq!(rounded(-2.5), -2);
        assert_eq!(rounded(3.4), 3);
    }

    #[test]
    fn current_panel_uses_unit_strings() {
        let metric = current_panel(&paris(), UnitSystem::Metric);
        assert!(metric.contains("Paris, FR"));
        assert!(metric.contains("19°C"));
        assert!(metric.contains("Feels like: 17°C"));
        assert!(metric.contains("Humidity: 64%"));
        assert!(metric.contains("Wind: 3 m/s"));

        let imperial = current_panel(&paris(), UnitSystem::Imperial);
        assert!(imperial.contains("19°F"));
        assert!(imperial.contains("mph"));
    }

    #[test]
    fn forecast_card_formats_day_in_zone() {
        let sample = ForecastSample {
            timestamp: 1714564800, // Wed 2024-05-01 12:00 UTC
            temperature: 21.6,
            category: WeatherCategory::Clear,
            icon: "01d".into(),
            description: "clear sky".into(),
        };

        let card = forecast_card(&sample, UnitSystem::Metric, &Utc);
        assert!(card.starts_with("Wed, May 1"));
        assert!(card.contains("clear sky"));
        assert!(card.ends_with("22°C"));
    }

    #[test]
    fn empty_view_shows_hints() {
        let out = dashboard(&ViewState::default(), DayBoundary::Viewer);
        assert!(out.contains(EMPTY_HINT));
        assert!(out.contains("Forecast unavailable"));
        assert!(out.contains("[°C]"));
        assert!(out.contains("🌙 Dark"));
    }

    #[test]
    fn errored_view_keeps_data_and_shows_banner() {
        let view = ViewState {
            current: Some(paris()),
            error: Some("Failed to fetch forecast".into()),
            units: UnitSystem::Imperial,
            theme: Theme::Dark,
            ..ViewState::default()
        };

        let out = dashboard(&view, DayBoundary::Viewer);
        assert!(out.contains("! Failed to fetch forecast"));
        assert!(out.contains("Paris, FR"));
        assert!(out.contains("backdrop: bg-rain"));
        assert!(out.contains("[°F]"));
        assert!(out.contains("☀️ Light"));
    }

    #[test]
    fn loading_line_appears_while_loading() {
        let view = ViewState {
            loading: true,
            ..ViewState::default()
        };
        assert!(dashboard(&view, DayBoundary::Viewer).contains("Loading…"));
    }
}
