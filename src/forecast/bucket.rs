use super::types::ForecastSample;
use chrono::{DateTime, Datelike, TimeZone};
use std::collections::HashMap;

/// Samples sharing one weekday label, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub label: String,
    pub samples: Vec<ForecastSample>,
}

/// Day buckets in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBuckets {
    buckets: Vec<DayBucket>,
}

impl DayBuckets {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayBucket> {
        self.buckets.iter()
    }
}

/// Convert a provider timestamp into the display zone.
///
/// Out-of-range timestamps land on the epoch so no sample is ever dropped.
pub fn local_time<Z: TimeZone>(timestamp: i64, zone: &Z) -> DateTime<Z> {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .with_timezone(zone)
}

/// Short weekday name ("Mon") for a timestamp in the display zone.
pub fn day_label<Z: TimeZone>(timestamp: i64, zone: &Z) -> String {
    local_time(timestamp, zone).weekday().to_string()
}

pub fn bucket_by_day<Z: TimeZone>(samples: &[ForecastSample], zone: &Z) -> DayBuckets {
    let mut buckets: Vec<DayBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        let label = day_label(sample.timestamp, zone);
        match index.get(&label) {
            Some(&i) => buckets[i].samples.push(sample.clone()),
            None => {
                index.insert(label.clone(), buckets.len());
                buckets.push(DayBucket {
                    label,
                    samples: vec![sample.clone()],
                });
            }
        }
    }

    DayBuckets { buckets }
}

/// The first `size` samples, ignoring day boundaries.
pub fn hourly_window(samples: &[ForecastSample], size: usize) -> &[ForecastSample] {
    &samples[..samples.len().min(size)]
}
