//! Sentinel HTTP exposition service
//!
//! Serves the summary document, the raw snapshot, liveness, Prometheus
//! gauges, and the on-disk evidence artifacts. Every handler reads the
//! last fully-published snapshot; none blocks on a run in flight.

pub mod artifacts;
pub mod metrics;
pub mod server;

pub use artifacts::ArtifactRoots;
pub use metrics::ScenarioMetrics;
pub use server::WebServer;
