// Downloadable snapshot of the current data
use super::metrics::AggregateMetrics;
use super::record::{NormalizedRecord, RawTimestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_records: usize,
    pub average_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub successful_records: usize,
    pub failed_records: usize,
    pub avg_requests_per_minute: f64,
}

impl From<&AggregateMetrics> for ExportSummary {
    fn from(m: &AggregateMetrics) -> Self {
        Self {
            total_records: m.total_records,
            average_response_time: m.avg_response_time_ms,
            min_response_time: m.min_response_time_ms,
            max_response_time: m.max_response_time_ms,
            successful_records: m.success_count,
            failed_records: m.fail_count,
            avg_requests_per_minute: m.requests_per_minute,
        }
    }
}

/// A raw record without its presentation-only `ParsedInfo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(rename = "Status")]
    pub status: Option<i64>,
    #[serde(rename = "ResponseTime")]
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub summary: ExportSummary,
    pub raw_records: Vec<ExportRecord>,
}

impl ExportSnapshot {
    /// `metrics` must be the aggregate already computed for `records`.
    pub fn new(metrics: &AggregateMetrics, records: &[NormalizedRecord]) -> Self {
        let raw_records = records
            .iter()
            .map(|r| ExportRecord {
                timestamp: r.raw.timestamp.clone(),
                status: r.raw.status,
                response_time: r.raw.response_time,
            })
            .collect();
        Self {
            summary: ExportSummary::from(metrics),
            raw_records,
        }
    }
}
