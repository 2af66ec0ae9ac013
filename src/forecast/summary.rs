use super::bucket::{local_time, DayBuckets};
use super::types::{DaySummary, ForecastSample, HourlyPoint};
use super::visuals;
use crate::utils::round_half_up;
use chrono::{TimeZone, Timelike};

/// The provider returns a sixth partial day; the dashboard shows five.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Twelve 3-hour samples, i.e. the next 36 hours.
pub const HOURLY_WINDOW: usize = 12;

/// Reduce the first `limit` buckets to one summary each.
///
/// The representative condition is the first sample's, not the most common one.
pub fn summarize_days(buckets: &DayBuckets, limit: usize) -> Vec<DaySummary> {
    buckets
        .iter()
        .take(limit)
        .filter_map(|bucket| {
            let first = bucket.samples.first()?;
            let (min, max) = bucket.samples.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), s| (min.min(s.temperature), max.max(s.temperature)),
            );

            Some(DaySummary {
                day: bucket.label.clone(),
                condition: first.condition.clone(),
                min: round_half_up(min),
                max: round_half_up(max),
                icon: visuals::icon_for(&first.condition).to_string(),
            })
        })
        .collect()
}

pub fn hourly_points<Z: TimeZone>(window: &[ForecastSample], zone: &Z) -> Vec<HourlyPoint> {
    window
        .iter()
        .map(|sample| HourlyPoint {
            time: format!("{:02}:00", local_time(sample.timestamp, zone).hour()),
            temperature: round_half_up(sample.temperature),
            condition: sample.condition.clone(),
            icon: visuals::icon_for(&sample.condition).to_string(),
        })
        .collect()
}
