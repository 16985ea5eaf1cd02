// Dashboard service - Use cases behind every dashboard interaction
use crate::application::highlight::HighlightTimer;
use crate::domain::dashboard::{DashboardState, DashboardView};
use crate::domain::export::ExportSnapshot;
use crate::domain::record::{parse_timestamp, RawTimestamp};
use crate::domain::window::{TimeWindow, WindowSettings, ZoomDirection};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

pub type SharedDashboard = Arc<RwLock<DashboardState>>;

/// Result of a window action. `applied == false` means the request was
/// rejected and the previous window is still active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowOutcome {
    pub applied: bool,
    pub window: Option<TimeWindow>,
}

pub struct DashboardService {
    state: SharedDashboard,
    highlight: Mutex<HighlightTimer>,
    highlight_duration: Duration,
}

impl DashboardService {
    pub fn new(settings: WindowSettings, highlight_duration: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(DashboardState::new(settings))),
            highlight: Mutex::new(HighlightTimer::new()),
            highlight_duration,
        }
    }

    /// Handle for the poller, which writes snapshots into the same state.
    pub fn shared_state(&self) -> SharedDashboard {
        self.state.clone()
    }

    pub async fn view(&self) -> DashboardView {
        self.state.read().await.view()
    }

    pub async fn selection(&self) -> Option<i64> {
        self.state.read().await.selection()
    }

    pub async fn zoom(&self, direction: ZoomDirection) -> WindowOutcome {
        let mut state = self.state.write().await;
        let applied = state.zoom(direction);
        tracing::debug!("zoom {:?} applied={}", direction, applied);
        WindowOutcome {
            applied,
            window: state.window(),
        }
    }

    pub async fn reset_zoom(&self) -> WindowOutcome {
        let mut state = self.state.write().await;
        let applied = state.reset_zoom();
        WindowOutcome {
            applied,
            window: state.window(),
        }
    }

    pub async fn filter_last_n_days(&self, days: u32) -> WindowOutcome {
        let mut state = self.state.write().await;
        let applied = state.filter_last_n_days(days);
        WindowOutcome {
            applied,
            window: state.window(),
        }
    }

    pub async fn set_manual_range(&self, start: &RawTimestamp, end: &RawTimestamp) -> WindowOutcome {
        let mut state = self.state.write().await;
        let applied = state.set_manual_range(start, end);
        if !applied {
            tracing::debug!("rejected manual range {:?}..{:?}", start, end);
        }
        WindowOutcome {
            applied,
            window: state.window(),
        }
    }

    /// Select a point and pulse its row. Returns the stored time, or `None`
    /// (nothing changed) when `time` does not parse.
    pub async fn select(&self, time: &RawTimestamp) -> Option<i64> {
        let time_ms = parse_timestamp(time)?;
        // A stale expiry must not clear the pulse set below.
        self.highlight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
        {
            let mut state = self.state.write().await;
            state.select(time_ms);
            state.set_highlight_active(true);
        }

        let weak = Arc::downgrade(&self.state);
        let mut timer = self.highlight.lock().unwrap_or_else(|e| e.into_inner());
        timer.schedule(self.highlight_duration, async move {
            if let Some(state) = weak.upgrade() {
                state.write().await.set_highlight_active(false);
            }
        });
        Some(time_ms)
    }

    pub async fn clear_selection(&self) {
        self.highlight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
        self.state.write().await.clear_selection();
    }

    pub async fn export(&self) -> Option<ExportSnapshot> {
        self.state.read().await.export()
    }
}
