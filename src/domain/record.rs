// Request record domain model and normalization
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest absolute epoch-millisecond value a browser `Date` accepts.
const MAX_EPOCH_MS: f64 = 8.64e15;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Timestamp as delivered by the data endpoint: either text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(f64),
    Text(String),
}

impl RawTimestamp {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(RawTimestamp::Millis),
            Value::String(s) => Some(RawTimestamp::Text(s.clone())),
            _ => None,
        }
    }
}

/// One observed HTTP request, field names as the endpoint sends them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(rename = "Status")]
    pub status: Option<i64>,
    #[serde(rename = "ResponseTime")]
    pub response_time: Option<f64>,
    #[serde(rename = "ParsedInfo", skip_serializing_if = "Option::is_none")]
    pub parsed_info: Option<String>,
}

impl RawRecord {
    pub fn new(timestamp: RawTimestamp, status: i64, response_time: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            status: Some(status),
            response_time: Some(response_time),
            parsed_info: None,
        }
    }

    /// Lenient decode of one element of the `records` array.
    ///
    /// Returns `None` only when the element is not an object; individual
    /// fields of the wrong type are treated as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            timestamp: obj.get("Timestamp").and_then(RawTimestamp::from_value),
            status: obj.get("Status").and_then(lenient_i64),
            response_time: obj.get("ResponseTime").and_then(lenient_f64),
            parsed_info: obj
                .get("ParsedInfo")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        })
    }
}

/// Coarse classification of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeverityBucket {
    Ok,
    Redirect,
    ClientError,
    ServerError,
}

impl SeverityBucket {
    pub fn from_status(status: i64) -> Self {
        match status {
            s if s < 300 => SeverityBucket::Ok,
            s if s < 400 => SeverityBucket::Redirect,
            s if s < 500 => SeverityBucket::ClientError,
            _ => SeverityBucket::ServerError,
        }
    }
}

/// Canonical record. `time_ms` is `None` when the timestamp could not be
/// parsed; such records never take part in time-ordered operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub time_ms: Option<i64>,
    pub status: Option<i64>,
    pub response_time_ms: Option<f64>,
    pub is_success: bool,
    pub severity: Option<SeverityBucket>,
    pub raw: RawRecord,
}

impl NormalizedRecord {
    pub fn has_time(&self) -> bool {
        self.time_ms.is_some()
    }
}

pub fn normalize(raw: RawRecord) -> NormalizedRecord {
    let time_ms = raw.timestamp.as_ref().and_then(parse_timestamp);
    let response_time_ms = raw.response_time.filter(|rt| rt.is_finite() && *rt >= 0.0);
    NormalizedRecord {
        time_ms,
        status: raw.status,
        response_time_ms,
        is_success: raw.status.is_some_and(|s| s < 400),
        severity: raw.status.map(SeverityBucket::from_status),
        raw,
    }
}

pub fn normalize_all(raws: Vec<RawRecord>) -> Vec<NormalizedRecord> {
    raws.into_iter().map(normalize).collect()
}

/// Resolve a timestamp to epoch milliseconds.
///
/// Numbers are epoch milliseconds (fraction truncated). Text is tried as
/// RFC 3339, RFC 2822, an offset-less date-time (read as UTC), a bare
/// date (UTC midnight) and finally a plain integer of epoch milliseconds.
pub fn parse_timestamp(ts: &RawTimestamp) -> Option<i64> {
    match ts {
        RawTimestamp::Millis(ms) => millis_from_f64(*ms),
        RawTimestamp::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp_millis());
    }
    text.parse::<i64>().ok().and_then(|ms| millis_from_f64(ms as f64))
}

fn millis_from_f64(ms: f64) -> Option<i64> {
    if ms.is_finite() && ms.abs() <= MAX_EPOCH_MS {
        Some(ms.trunc() as i64)
    } else {
        None
    }
}

/// Records with a resolved time, sorted ascending. Stable: ties keep
/// input order.
pub fn sort_by_time(records: &[NormalizedRecord]) -> Vec<&NormalizedRecord> {
    let mut timed: Vec<&NormalizedRecord> = records.iter().filter(|r| r.has_time()).collect();
    timed.sort_by_key(|r| r.time_ms);
    timed
}

/// Observed `(min, max)` time over records with a resolved time.
pub fn observed_range(records: &[NormalizedRecord]) -> Option<(i64, i64)> {
    records.iter().filter_map(|r| r.time_ms).fold(None, |acc, t| match acc {
        None => Some((t, t)),
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
    })
}

pub(crate) fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(ts: RawTimestamp, status: i64) -> NormalizedRecord {
        normalize(RawRecord::new(ts, status, 10.0))
    }

    #[test]
    fn test_parse_numeric_and_text_timestamps() {
        assert_eq!(parse_timestamp(&RawTimestamp::Millis(60000.7)), Some(60000));
        assert_eq!(
            parse_timestamp(&RawTimestamp::Text("1970-01-01T00:01:00Z".into())),
            Some(60000)
        );
        assert_eq!(
            parse_timestamp(&RawTimestamp::Text("1970-01-01T01:01:00+01:00".into())),
            Some(60000)
        );
        assert_eq!(
            parse_timestamp(&RawTimestamp::Text("1970-01-01 00:01:00.250".into())),
            Some(60250)
        );
        assert_eq!(
            parse_timestamp(&RawTimestamp::Text("1970-01-02".into())),
            Some(86_400_000)
        );
        assert_eq!(parse_timestamp(&RawTimestamp::Text("60000".into())), Some(60000));
    }

    #[test]
    fn test_unparsable_timestamp_is_none() {
        assert_eq!(parse_timestamp(&RawTimestamp::Text("yesterday".into())), None);
        assert_eq!(parse_timestamp(&RawTimestamp::Text("".into())), None);
        assert_eq!(parse_timestamp(&RawTimestamp::Millis(f64::NAN)), None);
        assert_eq!(parse_timestamp(&RawTimestamp::Millis(1e20)), None);
    }

    #[test]
    fn test_classification() {
        let ok = record(RawTimestamp::Millis(0.0), 204);
        assert!(ok.is_success);
        assert_eq!(ok.severity, Some(SeverityBucket::Ok));

        let redirect = record(RawTimestamp::Millis(0.0), 302);
        assert!(redirect.is_success);
        assert_eq!(redirect.severity, Some(SeverityBucket::Redirect));

        let not_found = record(RawTimestamp::Millis(0.0), 404);
        assert!(!not_found.is_success);
        assert_eq!(not_found.severity, Some(SeverityBucket::ClientError));

        let boom = record(RawTimestamp::Millis(0.0), 503);
        assert!(!boom.is_success);
        assert_eq!(boom.severity, Some(SeverityBucket::ServerError));
    }

    #[test]
    fn test_bad_timestamp_keeps_status() {
        let r = record(RawTimestamp::Text("not a date".into()), 200);
        assert_eq!(r.time_ms, None);
        assert!(r.is_success);
    }

    #[test]
    fn test_lenient_decode() {
        let value = json!({
            "Timestamp": "2024-03-01T12:00:00Z",
            "Status": "500",
            "ResponseTime": 12.5,
            "ParsedInfo": "<b>GET /</b>"
        });
        let raw = RawRecord::from_value(&value).unwrap();
        assert_eq!(raw.status, Some(500));
        assert_eq!(raw.response_time, Some(12.5));
        assert_eq!(raw.parsed_info.as_deref(), Some("<b>GET /</b>"));

        let odd = RawRecord::from_value(&json!({"Timestamp": true, "Status": null})).unwrap();
        assert_eq!(odd.timestamp, None);
        assert_eq!(odd.status, None);
        let n = normalize(odd);
        assert!(!n.is_success);
        assert_eq!(n.severity, None);

        assert!(RawRecord::from_value(&json!(42)).is_none());
    }

    #[test]
    fn test_negative_response_time_dropped() {
        let n = normalize(RawRecord::new(RawTimestamp::Millis(0.0), 200, -3.0));
        assert_eq!(n.response_time_ms, None);
    }

    #[test]
    fn test_sort_by_time_is_stable_and_skips_untimed() {
        let records = vec![
            normalize(RawRecord::new(RawTimestamp::Millis(500.0), 200, 1.0)),
            normalize(RawRecord::new(RawTimestamp::Text("??".into()), 200, 2.0)),
            normalize(RawRecord::new(RawTimestamp::Millis(100.0), 200, 3.0)),
            normalize(RawRecord::new(RawTimestamp::Millis(500.0), 200, 4.0)),
        ];
        let sorted: Vec<f64> = sort_by_time(&records)
            .iter()
            .filter_map(|r| r.response_time_ms)
            .collect();
        assert_eq!(sorted, vec![3.0, 1.0, 4.0]);
        assert_eq!(observed_range(&records), Some((100, 500)));
    }
}
