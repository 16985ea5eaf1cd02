// Payload returned by the data endpoint
use super::record::{lenient_f64, RawRecord};
use serde::Serialize;
use serde_json::Value;

/// Precomputed values the backend may send. Display hints only: they
/// never feed into the recomputed metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHints {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub req_per_min: Option<f64>,
    pub success: Option<f64>,
    pub fail: Option<f64>,
    pub availability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardPayload {
    pub records: Vec<RawRecord>,
    pub hints: ServerHints,
    /// Elements of `records` that were not objects.
    pub skipped: usize,
}

impl DashboardPayload {
    /// Decode without failing: a missing or non-array `records` becomes
    /// empty, missing or malformed hints become `None`.
    pub fn from_value(value: &Value) -> Self {
        let mut payload = Self::default();

        if let Some(items) = value.get("records").and_then(Value::as_array) {
            for item in items {
                match RawRecord::from_value(item) {
                    Some(raw) => payload.records.push(raw),
                    None => payload.skipped += 1,
                }
            }
        }

        if let Some(metrics) = value.get("metrics").filter(|m| m.is_object()) {
            let field = |name: &str| metrics.get(name).and_then(lenient_f64);
            payload.hints.avg = field("avg");
            payload.hints.min = field("min");
            payload.hints.max = field("max");
            payload.hints.req_per_min = field("req_per_min").or_else(|| field("avg_req_per_min"));
            payload.hints.success = field("success");
            payload.hints.fail = field("fail");
        }
        payload.hints.availability = value.get("availability").and_then(lenient_f64);

        payload
    }
}
