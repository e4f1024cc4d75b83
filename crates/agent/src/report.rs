//! Report generation
//!
//! After every execution the raw per-run result files are merged into one
//! aggregate and rendered as a browsable HTML report with linked evidence.
//! The whole step is best-effort: the orchestrator logs and swallows any
//! error raised here.

use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use sentinel_common::{Error, ExecutionSnapshot, Result, TestState};

/// Merges raw result files and renders the consolidated report
pub struct ReportBuilder {
    results_dir: PathBuf,
    report_dir: PathBuf,
}

impl ReportBuilder {
    pub fn new(results_dir: PathBuf, report_dir: PathBuf) -> Self {
        Self {
            results_dir,
            report_dir,
        }
    }

    /// Rebuild the report directory from the current raw results
    pub async fn generate(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.report_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let merged = self.merge().await?;
        tokio::fs::create_dir_all(&self.report_dir).await?;

        let json = serde_json::to_string_pretty(&merged)?;
        tokio::fs::write(self.report_dir.join("merged.json"), json).await?;
        tokio::fs::write(self.report_dir.join("report.html"), render_html(&merged)).await?;

        info!(
            tests = merged.total_tests,
            failed = merged.total_failed,
            "report rendered to {}",
            self.report_dir.display()
        );
        Ok(())
    }

    /// Merge every raw `*.json` result file into one aggregate
    async fn merge(&self) -> Result<ExecutionSnapshot> {
        let mut entries = tokio::fs::read_dir(&self.results_dir)
            .await
            .map_err(|e| Error::Report(format!("{}: {}", self.results_dir.display(), e)))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
        // Deterministic merge order regardless of directory iteration
        files.sort();

        let mut merged = ExecutionSnapshot::default();
        for path in files {
            debug!("merging {}", path.display());
            let content = tokio::fs::read_to_string(&path).await?;
            let part: ExecutionSnapshot = serde_json::from_str(&content)
                .map_err(|e| Error::Report(format!("{}: {}", path.display(), e)))?;
            merge_into(&mut merged, part);
        }
        Ok(merged)
    }
}

fn merge_into(acc: &mut ExecutionSnapshot, part: ExecutionSnapshot) {
    acc.runs.extend(part.runs);
    acc.total_duration += part.total_duration;
    acc.total_suites += part.total_suites;
    acc.total_tests += part.total_tests;
    acc.total_failed += part.total_failed;
    acc.total_passed += part.total_passed;
    acc.total_pending += part.total_pending;
    acc.total_skipped += part.total_skipped;

    acc.started_tests_at = match (acc.started_tests_at.take(), part.started_tests_at) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    acc.ended_tests_at = match (acc.ended_tests_at.take(), part.ended_tests_at) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
}

fn render_html(snapshot: &ExecutionSnapshot) -> String {
    let mut rows = String::new();
    for run in &snapshot.runs {
        let video_html = run
            .video_file_name()
            .map(|name| format!(r#"<a href="../videos/{name}">video</a>"#))
            .unwrap_or_default();

        for test in &run.tests {
            let state_class = match test.state {
                TestState::Passed => "passed",
                TestState::Failed => "failed",
                TestState::Pending => "pending",
                TestState::Skipped => "skipped",
            };
            rows.push_str(&format!(
                r#"<tr class="{state_class}"><td>{title}</td><td>{state}</td><td>{duration} ms</td><td>{video_html}</td></tr>
"#,
                title = html_escape(&test.display_title()),
                state = test.state,
                duration = test.duration_ms(),
            ));
        }
    }

    let generated_at = chrono::Utc::now().to_rfc3339();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Sentinel status</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border: 1px solid #ccc; padding: 6px 10px; text-align: left; }}
tr.passed td:nth-child(2) {{ color: #070; }}
tr.failed td:nth-child(2) {{ color: #a00; font-weight: bold; }}
tr.pending td:nth-child(2), tr.skipped td:nth-child(2) {{ color: #777; }}
</style>
</head>
<body>
<h1>Last run</h1>
<p>{passed} passed, {failed} failed, {pending} pending, {skipped} skipped
({total} tests in {duration} ms)</p>
<table>
<tr><th>Scenario</th><th>State</th><th>Duration</th><th>Evidence</th></tr>
{rows}</table>
<p><small>Generated {generated_at}</small></p>
</body>
</html>
"#,
        passed = snapshot.total_passed,
        failed = snapshot.total_failed,
        pending = snapshot.total_pending,
        skipped = snapshot.total_skipped,
        total = snapshot.total_tests,
        duration = snapshot.total_duration,
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
