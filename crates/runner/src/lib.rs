//! Sentinel scenario runner
//!
//! The seam between the orchestrator and the external browser-automation
//! engine. The engine is consumed, not implemented: [`ScenarioRunner`] is
//! the contract, and [`ProcessRunner`] drives a real CLI as a subprocess
//! and parses the result aggregate it prints on completion.

pub mod process;
pub mod runner;

pub use process::{ProcessRunner, ProcessRunnerConfig};
pub use runner::{RunRequest, ScenarioRunner};
