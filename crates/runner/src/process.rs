//! Subprocess-backed scenario runner
//!
//! Spawns the external browser-automation CLI, lets its progress output flow
//! to our stderr, and parses the result aggregate the tool prints to stdout
//! when the suite finishes.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use sentinel_common::{Error, ExecutionSnapshot, Result};

use crate::runner::{RunRequest, ScenarioRunner};

/// Placeholder in the argument template replaced by the spec pattern
pub const SPEC_PLACEHOLDER: &str = "{spec}";
/// Placeholder replaced by `true`/`false` video capture
pub const VIDEO_PLACEHOLDER: &str = "{video}";

/// Configuration for the subprocess runner
#[derive(Debug, Clone)]
pub struct ProcessRunnerConfig {
    /// Program to execute
    pub program: String,

    /// Argument template; `{spec}` and `{video}` are substituted per run
    pub args: Vec<String>,

    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,

    /// Kill the run and fail the iteration after this long
    pub run_timeout: Option<Duration>,
}

impl Default for ProcessRunnerConfig {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec![
                "cypress".to_string(),
                "run".to_string(),
                "--quiet".to_string(),
                "--spec".to_string(),
                SPEC_PLACEHOLDER.to_string(),
                "--config".to_string(),
                format!("video={}", VIDEO_PLACEHOLDER),
            ],
            working_dir: None,
            run_timeout: None,
        }
    }
}

/// Runs the suite by spawning the configured command once per iteration
pub struct ProcessRunner {
    config: ProcessRunnerConfig,
}

impl ProcessRunner {
    pub fn new(config: ProcessRunnerConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, request: &RunRequest) -> Vec<String> {
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace(SPEC_PLACEHOLDER, &request.spec_pattern)
                    .replace(VIDEO_PLACEHOLDER, if request.video { "true" } else { "false" })
            })
            .collect()
    }

    async fn run_child(&self, args: &[String]) -> Result<std::process::Output> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .stdin(Stdio::null())
            // If the timeout fires we drop the wait future; make sure the
            // child does not outlive it.
            .kill_on_drop(true);

        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            Error::RunnerStartup(format!("failed to spawn {}: {}", self.config.program, e))
        })?;

        match self.config.run_timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(output) => Ok(output?),
                Err(_) => Err(Error::RunTimeout {
                    seconds: limit.as_secs(),
                }),
            },
            None => Ok(child.wait_with_output().await?),
        }
    }
}

#[async_trait]
impl ScenarioRunner for ProcessRunner {
    async fn run(&self, request: &RunRequest) -> Result<ExecutionSnapshot> {
        let args = self.build_args(request);
        info!(program = %self.config.program, spec = %request.spec_pattern, "running scenario suite");
        debug!(?args, "runner invocation");

        let output = self.run_child(&args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // Scenario failures still produce a result aggregate and a nonzero
        // exit code; only treat the run as a collaborator failure when no
        // aggregate can be recovered from stdout.
        match extract_trailing_json(&stdout) {
            Ok(snapshot) => {
                if !output.status.success() {
                    warn!(status = ?output.status.code(), "runner exited nonzero; aggregate recovered");
                }
                Ok(snapshot)
            }
            Err(e) if !output.status.success() => Err(Error::RunnerOutput(format!(
                "exit status {:?}: {}",
                output.status.code(),
                e
            ))),
            Err(e) => Err(e),
        }
    }
}

/// Recover the JSON result aggregate from the tail of the runner's stdout
///
/// The CLI may print progress noise before the aggregate, so parsing starts
/// at each `{` in turn and the first candidate that deserializes wins.
pub fn extract_trailing_json(stdout: &str) -> Result<ExecutionSnapshot> {
    for (idx, _) in stdout.match_indices('{') {
        let candidate = stdout[idx..].trim_end();
        if let Ok(snapshot) = serde_json::from_str::<ExecutionSnapshot>(candidate) {
            return Ok(snapshot);
        }
    }
    Err(Error::RunnerOutput(format!(
        "no JSON aggregate found in {} bytes of output",
        stdout.len()
    )))
}
