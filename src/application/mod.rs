// Application layer - Use cases and ports
pub mod dashboard_service;
pub mod highlight;
pub mod poller;
pub mod record_source;
