//! Observability of the exchange: logging initialization and the metrics
//! registry shared by every component.
pub mod metrics;
pub mod tracing;
