pub mod bucket;
pub mod mock;
pub mod openweather;
pub mod provider;
pub mod summary;
pub mod types;
pub mod visuals;

use chrono::TimeZone;
use types::{DaySummary, ForecastResponse, ForecastSample, HourlyPoint};

/// Daily summaries and the hourly window for one forecast response.
pub fn shape_forecast<Z: TimeZone>(
    forecast: &ForecastResponse,
    zone: &Z,
) -> (Vec<DaySummary>, Vec<HourlyPoint>) {
    let samples: Vec<ForecastSample> = forecast.list.iter().map(ForecastSample::from).collect();

    let buckets = bucket::bucket_by_day(&samples, zone);
    if buckets.is_empty() {
        tracing::warn!("Forecast response contained no samples");
    } else {
        tracing::debug!("Bucketed {} forecast samples into {} days", samples.len(), buckets.len());
    }
    let daily = summary::summarize_days(&buckets, summary::MAX_FORECAST_DAYS);
    let hourly = summary::hourly_points(
        bucket::hourly_window(&samples, summary::HOURLY_WINDOW),
        zone,
    );

    (daily, hourly)
}
