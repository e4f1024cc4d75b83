//! Prometheus exposition of scenario outcomes
//!
//! Two gauge families keyed by the scenario's display title: status
//! (+1 passed, -1 failed, 0 otherwise) and first-attempt timing. A
//! synthetic `rollup` status series summarizes the whole run. Gauges are
//! recomputed from the published snapshot at scrape time, so a scrape can
//! never observe a half-updated series.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use sentinel_common::{ExecutionSnapshot, TestState};

/// Label value of the whole-run summary series
pub const ROLLUP_SCENARIO: &str = "rollup";

/// Scenario gauges and their registry
pub struct ScenarioMetrics {
    registry: Registry,
    scenario_status: GaugeVec,
    scenario_timing: GaugeVec,
}

impl ScenarioMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scenario_status = GaugeVec::new(
            Opts::new(
                "scenario_status",
                "Whether the scenario is passing (1), failing (-1) or not run (0)",
            ),
            &["scenario"],
        )?;
        registry.register(Box::new(scenario_status.clone()))?;

        let scenario_timing = GaugeVec::new(
            Opts::new(
                "scenario_timing",
                "How long the scenario's first attempt took, in milliseconds",
            ),
            &["scenario"],
        )?;
        registry.register(Box::new(scenario_timing.clone()))?;

        Ok(Self {
            registry,
            scenario_status,
            scenario_timing,
        })
    }

    /// Recompute every series from the given snapshot
    ///
    /// Stale series from superseded runs are dropped first; observations
    /// always reflect only the most recent run.
    pub fn observe(&self, snapshot: &ExecutionSnapshot) {
        self.scenario_status.reset();
        self.scenario_timing.reset();

        let mut all_passing = true;
        for test in snapshot.scenarios() {
            let title = test.display_title();
            let status = match test.state {
                TestState::Passed => 1.0,
                TestState::Failed => {
                    all_passing = false;
                    -1.0
                }
                TestState::Pending | TestState::Skipped => 0.0,
            };
            self.scenario_status
                .with_label_values(&[&title])
                .set(status);
            self.scenario_timing
                .with_label_values(&[&title])
                .set(test.duration_ms() as f64);
        }

        let rollup = if !snapshot.has_runs() {
            0.0
        } else if all_passing {
            1.0
        } else {
            -1.0
        };
        self.scenario_status
            .with_label_values(&[ROLLUP_SCENARIO])
            .set(rollup);
    }

    /// Gather all series in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("non-utf8 exposition: {e}")))
    }
}
