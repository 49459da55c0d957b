//! Metrics Export
//!
//! Downstream consumer of the volume records: Prometheus gauges and the HTTP
//! endpoint serving them.

pub mod metrics;
pub mod server;

pub use metrics::{VolumeGauge, VolumeMetrics, VOLUME_LABELS};
pub use server::run_metrics_server;
