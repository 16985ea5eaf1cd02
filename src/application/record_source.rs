// Port for fetching record snapshots from the data endpoint
use crate::domain::snapshot::DashboardPayload;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response is not JSON: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the current snapshot. Malformed content is tolerated and
    /// decoded to defaults; only transport-level problems are errors.
    async fn fetch_snapshot(&self) -> Result<DashboardPayload, SourceError>;

    /// Where the data comes from, for logs.
    fn describe(&self) -> String;
}
