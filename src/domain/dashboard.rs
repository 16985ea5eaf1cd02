// Dashboard domain model: one snapshot plus the view state over it
use super::export::ExportSnapshot;
use super::metrics::{aggregate, AggregateMetrics};
use super::record::{normalize_all, observed_range, NormalizedRecord, RawTimestamp};
use super::selection::SelectionCoordinator;
use super::snapshot::{DashboardPayload, ServerHints};
use super::telemetry::{response_time_series, ChartPoint};
use super::window::{
    TickGranularity, TickLabel, TimeWindow, TimeWindowEngine, WindowSettings, ZoomDirection,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Last transport failure. Set while the shown data is stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightState {
    /// Index into the view's `records` of the row to scroll to.
    pub index: Option<usize>,
    pub active: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub metrics: AggregateMetrics,
    pub window_metrics: AggregateMetrics,
    pub records: Vec<NormalizedRecord>,
    pub series: Vec<ChartPoint>,
    pub window: Option<TimeWindow>,
    pub granularity: Option<TickGranularity>,
    pub ticks: Vec<TickLabel>,
    pub selection: Option<i64>,
    /// Visible records matching the selection exactly.
    pub selected_records: Vec<NormalizedRecord>,
    pub highlight: HighlightState,
    pub server_hints: ServerHints,
    pub error: Option<FetchFailure>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    records: Vec<NormalizedRecord>,
    metrics: AggregateMetrics,
    hints: ServerHints,
    engine: TimeWindowEngine,
    selection: SelectionCoordinator,
    highlight_active: bool,
    last_error: Option<FetchFailure>,
    last_seq: Option<u64>,
    fetched_at: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn new(settings: WindowSettings) -> Self {
        Self {
            records: Vec::new(),
            metrics: AggregateMetrics::default(),
            hints: ServerHints::default(),
            engine: TimeWindowEngine::new(settings),
            selection: SelectionCoordinator::new(),
            highlight_active: false,
            last_error: None,
            last_seq: None,
            fetched_at: None,
        }
    }

    /// Replace the snapshot wholesale. Snapshots older than the last one
    /// applied are dropped; returns whether `payload` was applied.
    pub fn apply_snapshot(&mut self, seq: u64, payload: DashboardPayload, at: DateTime<Utc>) -> bool {
        if self.last_seq.is_some_and(|last| seq <= last) {
            tracing::debug!("dropping superseded snapshot {}", seq);
            return false;
        }

        let records = normalize_all(payload.records);
        self.metrics = aggregate(&records);
        self.engine.observe(observed_range(&records));
        self.records = records;
        self.hints = payload.hints;
        self.last_seq = Some(seq);
        self.last_error = None;
        self.fetched_at = Some(at);
        true
    }

    /// Flag a failed fetch; the last good snapshot stays in place.
    pub fn record_failure(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        self.last_error = Some(FetchFailure {
            message: message.into(),
            at,
        });
    }

    #[cfg(test)]
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    #[cfg(test)]
    pub fn metrics(&self) -> &AggregateMetrics {
        &self.metrics
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&FetchFailure> {
        self.last_error.as_ref()
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.engine.window()
    }

    pub fn selection(&self) -> Option<i64> {
        self.selection.selected()
    }

    /// Zoom around the selected point, or the window midpoint without one.
    pub fn zoom(&mut self, direction: ZoomDirection) -> bool {
        self.engine.zoom(direction, self.selection.selected())
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.engine.reset()
    }

    pub fn filter_last_n_days(&mut self, days: u32) -> bool {
        self.engine.filter_last_n_days(days)
    }

    pub fn set_manual_range(&mut self, start: &RawTimestamp, end: &RawTimestamp) -> bool {
        self.engine.set_manual_range(start, end)
    }

    pub fn select(&mut self, time_ms: i64) {
        self.selection.select(time_ms);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.highlight_active = false;
    }

    pub fn set_highlight_active(&mut self, active: bool) {
        self.highlight_active = active;
    }

    pub fn visible_records(&self) -> Vec<&NormalizedRecord> {
        self.engine.visible_records(&self.records)
    }

    pub fn view(&self) -> DashboardView {
        let visible: Vec<NormalizedRecord> = self.visible_records().into_iter().cloned().collect();
        let selected = self.selection.selected();
        let index = selected.and_then(|t| SelectionCoordinator::highlight_index(&visible, t));
        let selected_records = selected
            .map(|t| {
                SelectionCoordinator::resolve(&visible, t)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        DashboardView {
            metrics: self.metrics,
            window_metrics: aggregate(&visible),
            series: response_time_series(&visible),
            window: self.engine.window(),
            granularity: self.engine.tick_granularity(),
            ticks: self.engine.ticks(),
            selection: selected,
            selected_records,
            highlight: HighlightState {
                index,
                active: self.highlight_active && index.is_some(),
            },
            server_hints: self.hints.clone(),
            error: self.last_error.clone(),
            fetched_at: self.fetched_at,
            records: visible,
        }
    }

    /// Snapshot for download, built from the metrics already on display.
    /// `None` when there is nothing to export.
    pub fn export(&self) -> Option<ExportSnapshot> {
        if self.records.is_empty() {
            return None;
        }
        Some(ExportSnapshot::new(&self.metrics, &self.records))
    }
}
