//! The orchestration loop
//!
//! One iteration: clear stale raw results, execute the suite, publish the
//! new snapshot, rebuild the report, sleep. A failed iteration leaves the
//! previous snapshot published and never stops the loop: the availability
//! of the next measurement matters more than the current one.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use sentinel_common::{Result, SnapshotStore};
use sentinel_runner::{RunRequest, ScenarioRunner};

use crate::report::ReportBuilder;

/// Drives repeated suite executions and publishes their outcomes
pub struct Orchestrator {
    runner: Arc<dyn ScenarioRunner>,
    store: SnapshotStore,
    report: ReportBuilder,
    results_dir: PathBuf,
    spec_pattern: String,
    interval: Duration,
}

impl Orchestrator {
    pub fn new(
        runner: Arc<dyn ScenarioRunner>,
        store: SnapshotStore,
        report: ReportBuilder,
        results_dir: PathBuf,
        spec_pattern: String,
        interval: Duration,
    ) -> Self {
        Self {
            runner,
            store,
            report,
            results_dir,
            spec_pattern,
            interval,
        }
    }

    /// Run the monitoring loop forever
    ///
    /// Iterations never overlap: the next one starts only after the
    /// previous one, including its sleep, has finished.
    pub async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            spec = %self.spec_pattern,
            "orchestrator started"
        );

        loop {
            if let Err(e) = self.run_once().await {
                error!("iteration failed, previous snapshot stays published: {}", e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Execute a single iteration
    pub async fn run_once(&self) -> Result<()> {
        self.clear_results().await?;

        let request = RunRequest::new(self.spec_pattern.clone());
        let snapshot = self.runner.run(&request).await?;

        info!(
            tests = snapshot.total_tests,
            passed = snapshot.total_passed,
            failed = snapshot.total_failed,
            duration_ms = snapshot.total_duration,
            "suite finished, publishing snapshot"
        );
        self.store.publish(snapshot);

        // Alerting (Slack etc.) would hook in here, after publish.

        if let Err(e) = self.report.generate().await {
            warn!("report generation failed: {}", e);
        }
        Ok(())
    }

    /// Discard raw results left by the previous iteration
    async fn clear_results(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.results_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sentinel_common::{Error, ExecutionSnapshot};

    struct QueuedRunner {
        outcomes: Mutex<Vec<Result<ExecutionSnapshot>>>,
        seen_patterns: Mutex<Vec<String>>,
    }

    impl QueuedRunner {
        fn new(outcomes: Vec<Result<ExecutionSnapshot>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                seen_patterns: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScenarioRunner for QueuedRunner {
        async fn run(&self, request: &RunRequest) -> Result<ExecutionSnapshot> {
            self.seen_patterns.lock().push(request.spec_pattern.clone());
            self.outcomes.lock().remove(0)
        }
    }

    fn snapshot(total_tests: u64) -> ExecutionSnapshot {
        ExecutionSnapshot {
            total_tests,
            ..Default::default()
        }
    }

    fn orchestrator(
        runner: Arc<dyn ScenarioRunner>,
        store: SnapshotStore,
        root: &std::path::Path,
    ) -> Orchestrator {
        Orchestrator::new(
            runner,
            store,
            ReportBuilder::new(root.join("results"), root.join("status")),
            root.join("results"),
            "specs/*-spec.js".to_string(),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn successful_iteration_publishes_the_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("results")).unwrap();

        let runner = Arc::new(QueuedRunner::new(vec![Ok(snapshot(3))]));
        let store = SnapshotStore::new();
        let orch = orchestrator(runner.clone(), store.clone(), dir.path());

        orch.run_once().await.unwrap();
        assert_eq!(store.current().total_tests, 3);
        assert_eq!(runner.seen_patterns.lock().as_slice(), ["specs/*-spec.js"]);
    }

    #[tokio::test]
    async fn failed_run_leaves_the_previous_snapshot_published() {
        let dir = tempfile::tempdir().unwrap();

        let runner = Arc::new(QueuedRunner::new(vec![
            Ok(snapshot(1)),
            Err(Error::RunnerStartup("browser crashed".into())),
        ]));
        let store = SnapshotStore::new();
        let orch = orchestrator(runner, store.clone(), dir.path());

        orch.run_once().await.unwrap();
        assert_eq!(store.current().total_tests, 1);

        let err = orch.run_once().await.unwrap_err();
        assert!(matches!(err, Error::RunnerStartup(_)));
        assert_eq!(store.current().total_tests, 1);
    }

    #[tokio::test]
    async fn stale_results_are_cleared_before_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        std::fs::create_dir_all(&results).unwrap();
        std::fs::write(results.join("stale.json"), "{}").unwrap();

        let orch = orchestrator(
            Arc::new(QueuedRunner::new(vec![Ok(snapshot(1))])),
            SnapshotStore::new(),
            dir.path(),
        );
        orch.run_once().await.unwrap();

        assert!(!results.join("stale.json").exists());
    }

    struct SlowRunner {
        delay: Duration,
        result: Mutex<Option<ExecutionSnapshot>>,
    }

    #[async_trait]
    impl ScenarioRunner for SlowRunner {
        async fn run(&self, _request: &RunRequest) -> Result<ExecutionSnapshot> {
            tokio::time::sleep(self.delay).await;
            Ok(self.result.lock().take().expect("single run"))
        }
    }

    #[tokio::test]
    async fn readers_see_the_previous_snapshot_while_a_run_is_in_flight() {
        let dir = tempfile::tempdir().unwrap();

        let store = SnapshotStore::new();
        store.publish(snapshot(1));

        let orch = Arc::new(orchestrator(
            Arc::new(SlowRunner {
                delay: Duration::from_millis(200),
                result: Mutex::new(Some(snapshot(5))),
            }),
            store.clone(),
            dir.path(),
        ));

        let running = tokio::spawn({
            let orch = orch.clone();
            async move { orch.run_once().await }
        });

        // Mid-execution the previous complete snapshot is still published.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.current().total_tests, 1);

        running.await.unwrap().unwrap();
        assert_eq!(store.current().total_tests, 5);
    }

    #[tokio::test]
    async fn report_failure_does_not_roll_back_the_publish() {
        // No results dir is recreated after cleanup, so report generation
        // fails while the run itself succeeds.
        let dir = tempfile::tempdir().unwrap();

        let store = SnapshotStore::new();
        let orch = orchestrator(
            Arc::new(QueuedRunner::new(vec![Ok(snapshot(2))])),
            store.clone(),
            dir.path(),
        );

        orch.run_once().await.unwrap();
        assert_eq!(store.current().total_tests, 2);
    }
}
