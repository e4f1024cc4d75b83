//! Summary projection: snapshot + base URL -> published JSON document
//!
//! Pure shaping only. The projector never touches the filesystem; video
//! links are derived from the artifact path recorded in the snapshot.

use serde::{Deserialize, Serialize};

use crate::model::ExecutionSnapshot;

/// One test entry in the summary document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTest {
    pub title: String,
    pub state: String,
    /// Absolute link to the run's video artifact, if one was captured
    #[serde(rename = "videoLink")]
    pub video_link: Option<String>,
}

/// Totals and test list for the most recent run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastRun {
    pub started_tests_at: Option<String>,
    pub ended_tests_at: Option<String>,
    pub total_duration: u64,
    pub total_suites: u64,
    pub total_tests: u64,
    pub total_failed: u64,
    pub total_passed: u64,
    pub total_pending: u64,
    pub total_skipped: u64,
    pub tests: Vec<SummaryTest>,
}

/// The machine-readable status document served at `/`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub last_run: LastRun,
    pub status_page_link: String,
    pub videos_link: String,
    pub screenshots_link: String,
    pub metrics_link: String,
}

/// Project the snapshot into the summary document
///
/// Tolerates the empty pre-first-run snapshot: the test list is empty and
/// the timestamp fields are null. Idempotent for a given snapshot and base
/// URL.
pub fn project(snapshot: &ExecutionSnapshot, base_url: &str) -> SummaryDocument {
    let base_url = base_url.trim_end_matches('/');

    let mut tests = Vec::with_capacity(snapshot.total_tests as usize);
    for run in &snapshot.runs {
        let video_link = run
            .video_file_name()
            .map(|name| format!("{base_url}/videos/{name}"));

        for test in &run.tests {
            tests.push(SummaryTest {
                title: test.display_title(),
                state: test.state.to_string(),
                video_link: video_link.clone(),
            });
        }
    }

    SummaryDocument {
        last_run: LastRun {
            started_tests_at: snapshot.started_tests_at.clone(),
            ended_tests_at: snapshot.ended_tests_at.clone(),
            total_duration: snapshot.total_duration,
            total_suites: snapshot.total_suites,
            total_tests: snapshot.total_tests,
            total_failed: snapshot.total_failed,
            total_passed: snapshot.total_passed,
            total_pending: snapshot.total_pending,
            total_skipped: snapshot.total_skipped,
            tests,
        },
        status_page_link: format!("{base_url}/status/report.html"),
        videos_link: format!("{base_url}/videos"),
        screenshots_link: format!("{base_url}/screenshots"),
        metrics_link: format!("{base_url}/metrics"),
    }
}
