//! Sentinel Common Library
//!
//! Shared types for the Sentinel synthetic-monitoring agent: the result
//! model produced by the execution collaborator, the published snapshot
//! cell, and the summary projection served over HTTP.

pub mod error;
pub mod model;
pub mod snapshot;
pub mod summary;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{Attempt, ExecutionSnapshot, ScenarioResult, SuiteRun, TestState};
pub use snapshot::SnapshotStore;
pub use summary::{SummaryDocument, SummaryTest};

/// Sentinel version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
