// HTTP record source - Fetches dashboard data over reqwest
use crate::application::record_source::{RecordSource, SourceError};
use crate::domain::snapshot::DashboardPayload;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRecordSource {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_snapshot(&self) -> Result<DashboardPayload, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(DashboardPayload::from_value(&value))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
