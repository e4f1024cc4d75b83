//! The execution-collaborator seam

use async_trait::async_trait;

use sentinel_common::{ExecutionSnapshot, Result};

/// Parameters for one suite execution
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Glob selecting the scenario files to execute
    pub spec_pattern: String,
    /// Whether the collaborator should capture video evidence
    pub video: bool,
}

impl RunRequest {
    pub fn new(spec_pattern: impl Into<String>) -> Self {
        Self {
            spec_pattern: spec_pattern.into(),
            video: true,
        }
    }
}

/// A collaborator that executes the full scenario suite once
///
/// An `Err` means the collaborator itself failed (crashed browser engine,
/// unparseable output, timeout) — scenario failures are data inside the
/// returned snapshot, not errors.
#[async_trait]
pub trait ScenarioRunner: Send + Sync {
    async fn run(&self, request: &RunRequest) -> Result<ExecutionSnapshot>;
}
