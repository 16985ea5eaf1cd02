use crate::domain::window::WindowSettings;
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    #[serde(default = "default_source_url")]
    pub url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowConfig {
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    #[serde(default = "default_min_span_ms")]
    pub min_span_ms: i64,
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
    #[serde(default)]
    pub label_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectionSettings {
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

fn default_source_url() -> String {
    "http://127.0.0.1:9000/dashboard-data/".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_zoom_step() -> f64 {
    0.2
}

fn default_min_span_ms() -> i64 {
    5_000
}

fn default_tick_count() -> usize {
    10
}

fn default_highlight_ms() -> u64 {
    1500
}

fn default_export_file_name() -> String {
    "recorded_data.json".to_string()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            zoom_step: default_zoom_step(),
            min_span_ms: default_min_span_ms(),
            tick_count: default_tick_count(),
            label_offset_minutes: 0,
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            highlight_ms: default_highlight_ms(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

impl SourceSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl SelectionSettings {
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

impl WindowConfig {
    /// Engine settings. Out-of-range values fall back to defaults.
    pub fn to_settings(&self) -> WindowSettings {
        let defaults = WindowSettings::default();

        let zoom_step = if self.zoom_step > 0.0 && self.zoom_step < 0.5 {
            self.zoom_step
        } else {
            tracing::warn!("zoom_step {} outside (0, 0.5), using {}", self.zoom_step, defaults.zoom_step);
            defaults.zoom_step
        };

        let label_offset = FixedOffset::east_opt(self.label_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| {
                tracing::warn!("label_offset_minutes {} out of range, using UTC", self.label_offset_minutes);
                Utc.fix()
            });

        WindowSettings {
            zoom_step,
            min_span_ms: self.min_span_ms.max(0),
            tick_count: self.tick_count.max(2),
            label_offset,
        }
    }
}

/// Load `config/dashboard.{toml,...}` if present, overridden by
/// `DASHBOARD__SECTION__KEY` environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
