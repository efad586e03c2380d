//! regionbench core - experiment orchestration and metrics collection
//!
//! The engine behind a benchmark run:
//! - Resolves a run configuration from variant, precision tier and insertion mode
//! - Derives one output file per scenario from that configuration
//! - Records one uniform metrics row per observed action
//! - Sequences the five scenarios and aborts on the first failure
//!
//! # Example
//!
//! ```rust,ignore
//! use regionbench_core::{RunConfiguration, ScenarioRunner};
//!
//! # async fn example(deployment: Deployment, input: InputData, suite: &dyn ScenarioSuite)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfiguration::resolve("GeohashCellsRegions", 1, "cells")?;
//! let runner = ScenarioRunner::new(config, "./out/", deployment, input);
//!
//! let report = runner.run(suite).await?;
//! println!("wrote {} rows", report.total_rows());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod output;
pub mod recorder;
pub mod remote;
pub mod runner;
pub mod scenario;
pub mod types;

// Re-exports for convenience
pub use config::{Family, InsertionMode, PrecisionIndex, RunConfiguration, Variant};
pub use error::{
    ConfigError, FixtureError, RecorderError, RemoteError, RunError, RunFailure, ScenarioError,
};
pub use output::{OutputPaths, DEFAULT_OUT_DIR};
pub use recorder::{Costs, MetricRow, MetricsRecorder, RecordRequest};
pub use remote::{
    BlockInfo, Deployment, DeviceRegistry, LedgerClient, RegionIndex, ReputationManager,
    TransactionInfo,
};
pub use runner::{RunReport, ScenarioOutput, ScenarioRunner};
pub use scenario::{InputDataProvider, ScenarioSuite};
pub use types::{
    Address, CellId, DeviceFixture, DeviceFixtures, DeviceMovement, FamilyFixtures, InputData,
    RegionFixture, RegionInteraction, ReputationEvent, ReputationQuery, ScenarioKind, TxHash,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
