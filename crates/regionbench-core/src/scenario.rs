//! Scenario and input-data seams
//!
//! Scenario bodies are opaque to the runner. Each method receives its own
//! recorder and only the inputs that scenario needs.

use crate::config::{InsertionMode, PrecisionIndex};
use crate::error::{FixtureError, ScenarioError};
use crate::recorder::MetricsRecorder;
use crate::remote::{DeviceRegistry, RegionIndex, ReputationManager};
use crate::types::{
    Address, CellId, DeviceFixtures, DeviceMovement, FamilyFixtures, InputData, RegionInteraction,
    ReputationEvent, ReputationQuery,
};
use async_trait::async_trait;

/// The five benchmark scenarios
#[async_trait]
pub trait ScenarioSuite: Send + Sync {
    /// Add every region of the family at the given tier
    async fn register_regions(
        &self,
        recorder: &MetricsRecorder,
        regions: &dyn RegionIndex,
        fixtures: &FamilyFixtures,
        precision: PrecisionIndex,
        mode: InsertionMode,
    ) -> Result<(), ScenarioError>;

    /// Drive region-to-region interactions; resolve lookup cells when supported
    async fn interact_regions(
        &self,
        recorder: &MetricsRecorder,
        regions: &dyn RegionIndex,
        fixtures: &FamilyFixtures,
        interactions: &[RegionInteraction],
        precision: PrecisionIndex,
        supports_direct_cell_lookup: bool,
    ) -> Result<(), ScenarioError>;

    /// Register devices into the regions added earlier
    async fn register_devices(
        &self,
        recorder: &MetricsRecorder,
        devices: &dyn DeviceRegistry,
        fixtures: &FamilyFixtures,
        device_fixtures: &DeviceFixtures,
        owner: &Address,
    ) -> Result<(), ScenarioError>;

    /// Replay the bulk movement sequence
    async fn move_devices(
        &self,
        recorder: &MetricsRecorder,
        devices: &dyn DeviceRegistry,
        sub_accounts: &[Address],
        sub_locations: &[CellId],
        movements: &[DeviceMovement],
    ) -> Result<(), ScenarioError>;

    /// Submit reputation events, then run the queries
    async fn manage_reputations(
        &self,
        recorder: &MetricsRecorder,
        reputation: &dyn ReputationManager,
        events: &[ReputationEvent],
        queries: &[ReputationQuery],
    ) -> Result<(), ScenarioError>;
}

/// Source of fixture data
#[async_trait]
pub trait InputDataProvider: Send + Sync {
    /// Load the complete fixture set
    async fn load(&self) -> Result<InputData, FixtureError>;
}
