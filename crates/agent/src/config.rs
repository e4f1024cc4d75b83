//! Agent configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Root directory for run artifacts (results, videos, screenshots, report)
    pub work_dir: PathBuf,

    /// HTTP listen port
    pub port: u16,

    /// Minutes to sleep between suite executions
    pub sleep_mins: u64,

    /// Glob selecting the scenario files to execute
    pub spec_pattern: String,

    /// Runner invocation
    pub runner: RunnerSection,
}

/// How to invoke the external browser-automation CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSection {
    pub program: String,

    /// Argument template; `{spec}` and `{video}` are substituted per run
    pub args: Vec<String>,

    /// Abort a run after this many seconds (unset = unbounded)
    pub run_timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let runner_defaults = sentinel_runner::ProcessRunnerConfig::default();
        Self {
            work_dir: PathBuf::from("cypress"),
            port: 3000,
            sleep_mins: 5,
            spec_pattern: "cypress/integration/*-spec.js".to_string(),
            runner: RunnerSection {
                program: runner_defaults.program,
                args: runner_defaults.args,
                run_timeout_secs: None,
            },
        }
    }
}

impl AgentConfig {
    /// Load configuration from file, falling back to defaults if absent
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Raw per-run result files, cleared at the start of every iteration
    pub fn results_dir(&self) -> PathBuf {
        self.work_dir.join("results")
    }

    /// Recorded video evidence
    pub fn videos_dir(&self) -> PathBuf {
        self.work_dir.join("videos")
    }

    /// Screenshot evidence
    pub fn screenshots_dir(&self) -> PathBuf {
        self.work_dir.join("screenshots")
    }

    /// Rendered report, served under /status
    pub fn report_dir(&self) -> PathBuf {
        self.work_dir.join("status")
    }

    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_mins * 60)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.runner.run_timeout_secs.map(Duration::from_secs)
    }
}
