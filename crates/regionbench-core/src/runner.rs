//! Scenario runner
//!
//! Sequences the five benchmark scenarios against one deployment:
//! - prepares the output directory and truncates every output file
//! - binds each scenario to its own [`MetricsRecorder`]
//! - runs scenarios strictly one after another, in [`ScenarioKind::ALL`] order
//! - stops at the first failure and reports it unchanged

use crate::config::RunConfiguration;
use crate::error::{RunError, RunFailure, ScenarioError};
use crate::output::OutputPaths;
use crate::recorder::{elapsed_millis_since, MetricsRecorder};
use crate::remote::Deployment;
use crate::scenario::ScenarioSuite;
use crate::types::{Address, FamilyFixtures, InputData, ScenarioKind};
use std::path::PathBuf;
use std::time::Instant;

/// Account that owns registered devices
const DEVICE_OWNER_ACCOUNT: usize = 1;

/// Outcome of one scenario's output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutput {
    /// Scenario
    pub kind: ScenarioKind,
    /// File the rows were written to
    pub path: PathBuf,
    /// Data rows written
    pub rows: u64,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Configuration the run used
    pub config: RunConfiguration,
    /// One entry per scenario, in execution order
    pub outputs: Vec<ScenarioOutput>,
    /// Wall-clock duration of the whole run
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Total data rows across all files
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.outputs.iter().map(|o| o.rows).sum()
    }
}

/// Runs the benchmark scenarios for one configuration
#[derive(Debug)]
pub struct ScenarioRunner {
    config: RunConfiguration,
    paths: OutputPaths,
    deployment: Deployment,
    input: InputData,
}

impl ScenarioRunner {
    /// Create a runner
    ///
    /// # Arguments
    /// * `config` - Resolved run configuration
    /// * `out_dir` - Directory receiving the CSV files
    /// * `deployment` - Remote handles
    /// * `input` - Fixture data
    #[must_use]
    pub fn new(
        config: RunConfiguration,
        out_dir: impl Into<PathBuf>,
        deployment: Deployment,
        input: InputData,
    ) -> Self {
        let paths = OutputPaths::build(out_dir, &config);
        Self {
            config,
            paths,
            deployment,
            input,
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Output paths
    #[inline]
    #[must_use]
    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Execute every scenario of `suite` in order
    ///
    /// # Errors
    /// Returns the first failure. Scenarios after the failing one are not
    /// started; files already written stay on disk.
    pub async fn run(&self, suite: &dyn ScenarioSuite) -> Result<RunReport, RunFailure> {
        let started = Instant::now();
        tracing::info!(config = %self.config, out_dir = %self.paths.dir().display(), "starting benchmark run");

        let recorders = self.prepare().await.map_err(|e| {
            tracing::error!(error = ?e, "run setup failed");
            RunFailure::setup(e)
        })?;
        let fixtures = self
            .input
            .family(self.config.family())
            .ok_or_else(|| RunFailure::setup(RunError::MissingFixtures(self.config.family())))?;
        let owner = self.device_owner().await.map_err(RunFailure::setup)?;

        let mut outputs = Vec::with_capacity(recorders.len());
        for (kind, recorder) in ScenarioKind::ALL.into_iter().zip(&recorders) {
            let scenario_started = Instant::now();
            tracing::info!(scenario = %kind, path = %recorder.path().display(), "scenario started");

            if let Err(e) = self.dispatch(suite, kind, recorder, fixtures, &owner).await {
                tracing::error!(scenario = %kind, error = ?e, "scenario failed, aborting run");
                return Err(RunFailure::in_scenario(kind, e));
            }

            let rows = recorder.rows_written().await;
            tracing::info!(
                scenario = %kind,
                rows,
                elapsed_ms = elapsed_millis_since(scenario_started),
                "scenario finished"
            );
            outputs.push(ScenarioOutput {
                kind,
                path: recorder.path().to_path_buf(),
                rows,
            });
        }

        let report = RunReport {
            config: self.config,
            outputs,
            elapsed_ms: elapsed_millis_since(started),
        };
        tracing::info!(rows = report.total_rows(), elapsed_ms = report.elapsed_ms, "benchmark run completed");
        Ok(report)
    }

    /// Create the directory and all five files before anything runs
    async fn prepare(&self) -> Result<Vec<MetricsRecorder>, RunError> {
        self.paths.ensure_dir().await?;
        let mut recorders = Vec::with_capacity(ScenarioKind::ALL.len());
        for (_, path) in self.paths.iter() {
            recorders.push(MetricsRecorder::create(path, self.deployment.client.clone()).await?);
        }
        Ok(recorders)
    }

    async fn device_owner(&self) -> Result<Address, RunError> {
        let accounts = self
            .deployment
            .client
            .accounts()
            .await
            .map_err(RunError::Accounts)?;
        accounts
            .into_iter()
            .nth(DEVICE_OWNER_ACCOUNT)
            .ok_or(RunError::MissingAccount(DEVICE_OWNER_ACCOUNT))
    }

    async fn dispatch(
        &self,
        suite: &dyn ScenarioSuite,
        kind: ScenarioKind,
        recorder: &MetricsRecorder,
        fixtures: &FamilyFixtures,
        owner: &Address,
    ) -> Result<(), ScenarioError> {
        let d = &self.deployment;
        let precision = self.config.precision_index();
        match kind {
            ScenarioKind::RegionRegistration => {
                suite
                    .register_regions(
                        recorder,
                        d.regions.as_ref(),
                        fixtures,
                        precision,
                        self.config.insertion_mode(),
                    )
                    .await
            }
            ScenarioKind::RegionInteraction => {
                suite
                    .interact_regions(
                        recorder,
                        d.regions.as_ref(),
                        fixtures,
                        &self.input.region_interactions,
                        precision,
                        self.config.supports_direct_cell_lookup(),
                    )
                    .await
            }
            ScenarioKind::DeviceRegistration => {
                suite
                    .register_devices(
                        recorder,
                        d.devices.as_ref(),
                        fixtures,
                        &self.input.devices,
                        owner,
                    )
                    .await
            }
            ScenarioKind::DeviceMovement => {
                suite
                    .move_devices(
                        recorder,
                        d.devices.as_ref(),
                        &self.input.devices.sub_accounts,
                        &fixtures.sub_locations,
                        &fixtures.device_movements,
                    )
                    .await
            }
            ScenarioKind::Reputation => {
                suite
                    .manage_reputations(
                        recorder,
                        d.reputation.as_ref(),
                        &self.input.reputations,
                        &self.input.reputation_queries,
                    )
                    .await
            }
        }
    }
}
