// Summary metrics over a set of normalized records
use super::record::{sort_by_time, NormalizedRecord};
use serde::Serialize;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Scalar summary of a record set.
///
/// Every field is zero for an empty set: averages, extremes, availability
/// and rate never surface as NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub total_records: usize,
    pub avg_response_time_ms: f64,
    pub min_response_time_ms: f64,
    pub max_response_time_ms: f64,
    pub success_count: usize,
    pub fail_count: usize,
    pub availability_pct: f64,
    pub requests_per_minute: f64,
}

pub fn aggregate(records: &[NormalizedRecord]) -> AggregateMetrics {
    let mut metrics = AggregateMetrics {
        total_records: records.len(),
        ..AggregateMetrics::default()
    };

    let mut sum = 0.0;
    let mut sampled = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for record in records {
        if record.status.is_some() {
            if record.is_success {
                metrics.success_count += 1;
            } else {
                metrics.fail_count += 1;
            }
        }
        if let Some(rt) = record.response_time_ms {
            sum += rt;
            sampled += 1;
            min = min.min(rt);
            max = max.max(rt);
        }
    }

    if sampled > 0 {
        metrics.avg_response_time_ms = sum / sampled as f64;
        metrics.min_response_time_ms = min;
        metrics.max_response_time_ms = max;
    }

    let classified = metrics.success_count + metrics.fail_count;
    if classified > 0 {
        metrics.availability_pct = metrics.success_count as f64 / classified as f64 * 100.0;
    }

    metrics.requests_per_minute = requests_per_minute(records);
    metrics
}

/// Requests per minute over the observed time span of the timed records.
pub fn requests_per_minute(records: &[NormalizedRecord]) -> f64 {
    let timed = sort_by_time(records);
    if timed.len() < 2 {
        return 0.0;
    }
    let (Some(first), Some(last)) = (
        timed.first().and_then(|r| r.time_ms),
        timed.last().and_then(|r| r.time_ms),
    ) else {
        return 0.0;
    };

    let duration_minutes = (last - first) as f64 / MS_PER_MINUTE;
    if duration_minutes <= 0.0 {
        return 0.0;
    }
    timed.len() as f64 / duration_minutes
}
