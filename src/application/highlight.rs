// Scoped timer for the transient row highlight
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// At most one pending expiry. Scheduling cancels the previous one and
/// dropping the timer cancels whatever is still pending.
#[derive(Debug, Default)]
pub struct HighlightTimer {
    pending: Option<JoinHandle<()>>,
}

impl HighlightTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_expire` after `delay`. Must be called inside a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, on_expire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for HighlightTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
