// Snapshot poller - Fetches the record endpoint on a fixed interval
use crate::application::dashboard_service::SharedDashboard;
use crate::application::record_source::RecordSource;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct SnapshotPoller {
    source: Arc<dyn RecordSource>,
    state: SharedDashboard,
    interval: Duration,
    seq: u64,
}

impl SnapshotPoller {
    pub fn new(source: Arc<dyn RecordSource>, state: SharedDashboard, interval: Duration) -> Self {
        Self {
            source,
            state,
            interval,
            seq: 0,
        }
    }

    /// Fetch once and replace the snapshot, or flag the failure while
    /// keeping the previous snapshot. Returns whether a snapshot was applied.
    pub async fn poll_once(&mut self) -> bool {
        self.seq += 1;
        let seq = self.seq;

        match self.source.fetch_snapshot().await {
            Ok(payload) => {
                if payload.skipped > 0 {
                    tracing::warn!("skipped {} malformed records from {}", payload.skipped, self.source.describe());
                }
                let count = payload.records.len();
                let applied = self.state.write().await.apply_snapshot(seq, payload, Utc::now());
                tracing::debug!("snapshot {} with {} records applied={}", seq, count, applied);
                applied
            }
            Err(e) => {
                tracing::warn!("fetch from {} failed: {}", self.source.describe(), e);
                self.state.write().await.record_failure(e.to_string(), Utc::now());
                false
            }
        }
    }

    /// Poll until the returned handle is dropped or shut down. Fetches run
    /// one at a time; a slow fetch delays the next tick instead of overlapping.
    pub fn spawn(mut self) -> PollerHandle {
        let task = tokio::spawn(async move {
            tracing::info!("polling {} every {:?}", self.source.describe(), self.interval);
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.poll_once().await;
            }
        });
        PollerHandle { task }
    }
}

pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::record_source::SourceError;
    use crate::domain::dashboard::DashboardState;
    use crate::domain::record::{RawRecord, RawTimestamp};
    use crate::domain::snapshot::DashboardPayload;
    use crate::domain::window::WindowSettings;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::RwLock;

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<DashboardPayload, SourceError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<DashboardPayload, SourceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordSource for ScriptedSource {
        async fn fetch_snapshot(&self) -> Result<DashboardPayload, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(DashboardPayload::default()))
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn payload(n: usize) -> DashboardPayload {
        DashboardPayload {
            records: (0..n)
                .map(|i| RawRecord::new(RawTimestamp::Millis(i as f64 * 1000.0), 200, 5.0))
                .collect(),
            ..DashboardPayload::default()
        }
    }

    fn shared() -> SharedDashboard {
        Arc::new(RwLock::new(DashboardState::new(WindowSettings::default())))
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(payload(3)),
            Err(SourceError::Transport("connection refused".into())),
        ]));
        let state = shared();
        let mut poller = SnapshotPoller::new(source, state.clone(), Duration::from_secs(5));

        assert!(poller.poll_once().await);
        assert!(!poller.poll_once().await);

        let guard = state.read().await;
        assert_eq!(guard.records().len(), 3);
        assert!(guard.error().unwrap().message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(SourceError::Status { status: 502, body: "bad gateway".into() }),
            Ok(payload(2)),
        ]));
        let state = shared();
        let mut poller = SnapshotPoller::new(source, state.clone(), Duration::from_secs(5));

        poller.poll_once().await;
        assert!(state.read().await.error().is_some());
        poller.poll_once().await;
        assert!(state.read().await.error().is_none());
        assert_eq!(state.read().await.records().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poller_ticks_on_interval() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(payload(1)), Ok(payload(2)), Ok(payload(3))]));
        let state = shared();
        let handle = SnapshotPoller::new(source.clone(), state.clone(), Duration::from_secs(5)).spawn();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.read().await.records().len(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.read().await.records().len(), 3);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }
}
