// Time window engine: zoom, range filters and tick granularity
use super::record::{parse_timestamp, NormalizedRecord, RawTimestamp};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowMode {
    Full,
    Zoomed,
    RangeFilter,
    ManualRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Visible time range, inclusive on both ends. Always `start <= end` and
/// inside the observed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
    pub mode: WindowMode,
}

impl TimeWindow {
    pub fn span(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start && time_ms <= self.end
    }
}

/// Label precision for the time axis, chosen from the window span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TickGranularity {
    /// span < 1 minute
    SubSecond,
    /// span < 1 hour
    Seconds,
    /// span < 24 hours
    HourOfDay,
    /// span < 90 days
    Day,
    /// span >= 90 days
    Month,
}

impl TickGranularity {
    pub fn for_span(span_ms: i64) -> Self {
        match span_ms {
            s if s < MS_PER_MINUTE => TickGranularity::SubSecond,
            s if s < MS_PER_HOUR => TickGranularity::Seconds,
            s if s < MS_PER_DAY => TickGranularity::HourOfDay,
            s if s < 90 * MS_PER_DAY => TickGranularity::Day,
            _ => TickGranularity::Month,
        }
    }

    pub fn format(&self, time_ms: i64, offset: FixedOffset) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp_millis(time_ms) else {
            return time_ms.to_string();
        };
        let dt = utc.with_timezone(&offset);
        match self {
            TickGranularity::SubSecond => format!(
                "{}.{:02}",
                dt.format("%H:%M:%S"),
                dt.timestamp_subsec_millis() / 10
            ),
            TickGranularity::Seconds => dt.format("%H:%M:%S").to_string(),
            TickGranularity::HourOfDay => dt.format("%d %b, %I:%M %p").to_string(),
            TickGranularity::Day => dt.format("%d %b").to_string(),
            TickGranularity::Month => dt.format("%b %Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickLabel {
    pub time_ms: i64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSettings {
    /// Fraction of the span each zoom step moves per side.
    pub zoom_step: f64,
    /// Zoom-in never produces a span below this.
    pub min_span_ms: i64,
    /// Tick count for spans of a day or more.
    pub tick_count: usize,
    pub label_offset: FixedOffset,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            zoom_step: 0.2,
            min_span_ms: 5_000,
            tick_count: 10,
            label_offset: Utc.fix(),
        }
    }
}

/// Owns the active window over the observed time range.
#[derive(Debug, Clone)]
pub struct TimeWindowEngine {
    settings: WindowSettings,
    observed: Option<(i64, i64)>,
    window: Option<TimeWindow>,
}

impl TimeWindowEngine {
    pub fn new(settings: WindowSettings) -> Self {
        Self {
            settings,
            observed: None,
            window: None,
        }
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    /// Track new observed bounds after a snapshot replacement.
    ///
    /// A full window follows the data. An explicit window is clamped to
    /// the new bounds and falls back to full once it no longer overlaps.
    pub fn observe(&mut self, bounds: Option<(i64, i64)>) {
        let Some((lo, hi)) = bounds else {
            self.observed = None;
            self.window = None;
            return;
        };

        match self.window {
            Some(w) if w.mode != WindowMode::Full => {
                self.observed = Some((lo, hi));
                let start = w.start.max(lo);
                let end = w.end.min(hi);
                if start > end {
                    tracing::debug!("window {}..{} left the data range, resetting", w.start, w.end);
                    self.reset_to_full(lo, hi);
                } else {
                    self.window = Some(TimeWindow {
                        start,
                        end,
                        mode: w.mode,
                    });
                }
            }
            _ => self.reset_to_full(lo, hi),
        }
    }

    pub fn reset_to_full(&mut self, observed_min: i64, observed_max: i64) {
        let (lo, hi) = if observed_min <= observed_max {
            (observed_min, observed_max)
        } else {
            (observed_max, observed_min)
        };
        self.observed = Some((lo, hi));
        self.window = Some(TimeWindow {
            start: lo,
            end: hi,
            mode: WindowMode::Full,
        });
    }

    /// Restore the full window over the current bounds.
    pub fn reset(&mut self) -> bool {
        match self.observed {
            Some((lo, hi)) => {
                self.reset_to_full(lo, hi);
                true
            }
            None => false,
        }
    }

    /// Zoom around `anchor` (the window midpoint when `None`).
    ///
    /// Zooming in scales the span by `1 - 2 * zoom_step`, zooming out by
    /// the inverse, so an in/out pair with the same anchor restores the
    /// span away from the edges. Each end is then clamped to the observed
    /// bounds on its own. Returns `false` when nothing changed.
    pub fn zoom(&mut self, direction: ZoomDirection, anchor: Option<i64>) -> bool {
        let (Some(current), Some((lo, hi))) = (self.window, self.observed) else {
            return false;
        };

        let span = current.span() as f64;
        let factor = 1.0 - 2.0 * self.settings.zoom_step;
        let new_span = match direction {
            ZoomDirection::In => span * factor,
            ZoomDirection::Out => (span / factor).max(self.settings.min_span_ms as f64),
        };

        if direction == ZoomDirection::In && new_span < self.settings.min_span_ms as f64 {
            return false;
        }
        if direction == ZoomDirection::Out && current.start <= lo && current.end >= hi {
            return false;
        }

        let midpoint = current.start + current.span() / 2;
        let anchor = anchor.unwrap_or(midpoint).clamp(lo, hi) as f64;
        let start = ((anchor - new_span / 2.0).round() as i64).clamp(lo, hi);
        let end = ((anchor + new_span / 2.0).round() as i64).clamp(start, hi);

        if direction == ZoomDirection::In && end - start < self.settings.min_span_ms {
            return false;
        }
        if start == current.start && end == current.end {
            return false;
        }

        let mode = if start == lo && end == hi {
            WindowMode::Full
        } else {
            WindowMode::Zoomed
        };
        self.window = Some(TimeWindow { start, end, mode });
        true
    }

    /// Show the last `days` days ending at the newest observed record.
    pub fn filter_last_n_days(&mut self, days: u32) -> bool {
        let Some((lo, hi)) = self.observed else {
            return false;
        };
        let start = hi.saturating_sub(MS_PER_DAY.saturating_mul(i64::from(days))).max(lo);
        self.window = Some(TimeWindow {
            start,
            end: hi,
            mode: WindowMode::RangeFilter,
        });
        true
    }

    /// Apply a user-entered range. Rejected (window untouched) unless both
    /// ends parse and `start < end`.
    pub fn set_manual_range(&mut self, start: &RawTimestamp, end: &RawTimestamp) -> bool {
        match (parse_timestamp(start), parse_timestamp(end)) {
            (Some(s), Some(e)) => self.set_manual_range_ms(s, e),
            _ => false,
        }
    }

    pub fn set_manual_range_ms(&mut self, start: i64, end: i64) -> bool {
        if start >= end {
            return false;
        }
        let Some((lo, hi)) = self.observed else {
            return false;
        };
        let (start, end) = (start.max(lo), end.min(hi));
        if start > end {
            return false;
        }
        self.window = Some(TimeWindow {
            start,
            end,
            mode: WindowMode::ManualRange,
        });
        true
    }

    /// Records inside the window, in input order.
    pub fn visible_records<'a>(&self, all: &'a [NormalizedRecord]) -> Vec<&'a NormalizedRecord> {
        let Some(window) = self.window else {
            return Vec::new();
        };
        all.iter()
            .filter(|r| r.time_ms.is_some_and(|t| window.contains(t)))
            .collect()
    }

    pub fn tick_granularity(&self) -> Option<TickGranularity> {
        self.window.map(|w| TickGranularity::for_span(w.span()))
    }

    /// Hourly ticks under a day, otherwise `tick_count` evenly spaced ones.
    pub fn ticks(&self) -> Vec<TickLabel> {
        let Some(window) = self.window else {
            return Vec::new();
        };
        let granularity = TickGranularity::for_span(window.span());

        let positions: Vec<i64> = if window.span() < MS_PER_DAY {
            (0..)
                .map(|i| window.start + i * MS_PER_HOUR)
                .take_while(|t| *t <= window.end)
                .collect()
        } else {
            let count = self.settings.tick_count.max(2);
            let step = window.span() as f64 / (count - 1) as f64;
            (0..count)
                .map(|i| window.start + (i as f64 * step).round() as i64)
                .collect()
        };

        positions
            .into_iter()
            .map(|time_ms| TickLabel {
                time_ms,
                label: granularity.format(time_ms, self.settings.label_offset),
            })
            .collect()
    }
}
