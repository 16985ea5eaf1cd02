// Chart series domain model
use super::record::{sort_by_time, NormalizedRecord, SeverityBucket};
use serde::Serialize;

/// One point on the response-time chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time_ms: i64,
    pub response_time_ms: f64,
    pub status: Option<i64>,
    pub severity: Option<SeverityBucket>,
}

impl ChartPoint {
    pub fn from_record(record: &NormalizedRecord) -> Option<Self> {
        Some(Self {
            time_ms: record.time_ms?,
            response_time_ms: record.response_time_ms?,
            status: record.status,
            severity: record.severity,
        })
    }
}

/// Chart series for a set of records, ascending by time.
pub fn response_time_series(records: &[NormalizedRecord]) -> Vec<ChartPoint> {
    sort_by_time(records)
        .into_iter()
        .filter_map(ChartPoint::from_record)
        .collect()
}
