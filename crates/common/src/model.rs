//! Result model: the outcome of one suite execution
//!
//! These shapes mirror the wire contract of the execution collaborator: a
//! run aggregate with per-suite runs, per-test results, and rollup counters.
//! Everything here is immutable once constructed; the orchestrator replaces
//! whole snapshots rather than editing them.

use serde::{Deserialize, Serialize};

/// Terminal state of one executed scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
    Passed,
    Failed,
    Pending,
    Skipped,
}

impl std::fmt::Display for TestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestState::Passed => write!(f, "passed"),
            TestState::Failed => write!(f, "failed"),
            TestState::Pending => write!(f, "pending"),
            TestState::Skipped => write!(f, "skipped"),
        }
    }
}

/// One execution attempt of a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Wall-clock duration of the attempt in milliseconds
    #[serde(default)]
    pub duration: u64,
}

/// One executed scenario within a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Title path segments, outermost suite first
    pub title: Vec<String>,
    pub state: TestState,
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

impl ScenarioResult {
    /// Display title: path segments joined for labelling and reporting
    pub fn display_title(&self) -> String {
        self.title.join(" | ")
    }

    /// Duration of the first attempt; 0 if the runner recorded none
    pub fn duration_ms(&self) -> u64 {
        self.attempts.first().map(|a| a.duration).unwrap_or(0)
    }
}

/// One spec file's worth of scenario results, with its recorded video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteRun {
    /// Path of the captured video artifact, if capture succeeded
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub tests: Vec<ScenarioResult>,
}

impl SuiteRun {
    /// File name of the video artifact, stripped of its directory
    pub fn video_file_name(&self) -> Option<&str> {
        self.video
            .as_deref()
            .and_then(|v| v.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
    }
}

/// The published outcome of one full suite execution
///
/// `Default` yields the empty pre-first-run snapshot: no runs, zeroed
/// counters, absent timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSnapshot {
    #[serde(default)]
    pub runs: Vec<SuiteRun>,
    #[serde(default)]
    pub started_tests_at: Option<String>,
    #[serde(default)]
    pub ended_tests_at: Option<String>,
    #[serde(default)]
    pub total_duration: u64,
    #[serde(default)]
    pub total_suites: u64,
    #[serde(default)]
    pub total_tests: u64,
    #[serde(default)]
    pub total_failed: u64,
    #[serde(default)]
    pub total_passed: u64,
    #[serde(default)]
    pub total_pending: u64,
    #[serde(default)]
    pub total_skipped: u64,
}

impl ExecutionSnapshot {
    /// Whether at least one run has been recorded
    pub fn has_runs(&self) -> bool {
        !self.runs.is_empty()
    }

    /// Iterate over every scenario result across all runs
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.runs.iter().flat_map(|run| run.tests.iter())
    }

    /// True when the snapshot has runs and every scenario passed
    pub fn all_passed(&self) -> bool {
        self.has_runs() && self.scenarios().all(|t| t.state == TestState::Passed)
    }
}
