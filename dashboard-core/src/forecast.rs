//! Collapse the 3-hour forecast feed into one entry per calendar day.

use chrono::{FixedOffset, Local, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::model::{DailyForecast, ForecastFeed, ForecastSample};

/// Maximum number of days kept from the feed.
pub const MAX_DAYS: usize = 5;

const NOON: u32 = 12;

/// Which clock decides where one calendar day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    /// Timezone of the machine running the dashboard.
    #[default]
    Viewer,
    /// UTC offset reported for the forecast location; falls back to the
    /// viewer's timezone when the feed has none.
    Location,
}

/// Reduce a feed using the configured day boundary.
pub fn reduce_feed(feed: &ForecastFeed, boundary: DayBoundary) -> DailyForecast {
    match (boundary, feed.utc_offset_secs.and_then(FixedOffset::east_opt)) {
        (DayBoundary::Location, Some(offset)) => reduce(&feed.samples, &offset),
        _ => reduce(&feed.samples, &Local),
    }
}

/// Pick one sample per calendar day (as seen in `zone`), keeping the first
/// [`MAX_DAYS`] days in the order they first appear.
///
/// Within a day the sample whose hour is closest to noon wins; on a tie the
/// earlier sample in the input is kept.
pub fn reduce<Tz: TimeZone>(samples: &[ForecastSample], zone: &Tz) -> DailyForecast {
    // (day, hour distance from noon, index into samples)
    let mut days: Vec<(NaiveDate, u32, usize)> = Vec::with_capacity(MAX_DAYS);

    for (idx, sample) in samples.iter().enumerate() {
        let Some(utc) = sample.time() else {
            tracing::debug!(
                timestamp = sample.timestamp,
                "skipping unrepresentable forecast sample"
            );
            continue;
        };
        let local = utc.with_timezone(zone);
        let day = local.date_naive();
        let distance = local.hour().abs_diff(NOON);

        match days.iter().position(|(d, _, _)| *d == day) {
            Some(pos) if distance < days[pos].1 => days[pos] = (day, distance, idx),
            Some(_) => {}
            None if days.len() < MAX_DAYS => days.push((day, distance, idx)),
            None => {}
        }
    }

    days.into_iter().map(|(_, _, idx)| samples[idx].clone()).collect()
}
