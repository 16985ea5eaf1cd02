// Domain layer - Pure aggregation and windowing over request records
pub mod dashboard;
pub mod export;
pub mod metrics;
pub mod record;
pub mod selection;
pub mod snapshot;
pub mod telemetry;
pub mod window;
