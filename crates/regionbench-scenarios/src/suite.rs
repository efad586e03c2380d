//! The benchmark scenarios
//!
//! Every state-changing call is recorded with its transaction (execution and
//! confirmation cost) and the wall time of the call. Read-only calls are
//! recorded with wall time only.

use async_trait::async_trait;
use regionbench_core::{
    Address, CellId, DeviceFixtures, DeviceMovement, DeviceRegistry, FamilyFixtures,
    InsertionMode, MetricsRecorder, PrecisionIndex, RecordRequest, RegionIndex,
    RegionInteraction, ReputationEvent, ReputationManager, ReputationQuery, ScenarioError,
    ScenarioSuite,
};
use std::time::Instant;

/// Action labels written to the `action` column
pub mod actions {
    /// Region added cell by cell
    pub const ADD_CELLS: &str = "add-cells";
    /// Region added through the tree structure
    pub const ADD_TREE: &str = "add-tree";
    /// Region-to-region interaction
    pub const INTERACT: &str = "interact";
    /// Cell resolved to its region
    pub const LOOKUP: &str = "lookup";
    /// Device registered into a region
    pub const REGISTER: &str = "register";
    /// Device moved to a sub-location
    pub const MOVE: &str = "move";
    /// Reputation event submitted
    pub const SUBMIT: &str = "submit";
    /// Reputation queried
    pub const QUERY: &str = "query";
}

/// Scenario bodies driving the remote deployment
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkSuite;

impl BenchmarkSuite {
    /// Create the suite
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScenarioSuite for BenchmarkSuite {
    async fn register_regions(
        &self,
        recorder: &MetricsRecorder,
        regions: &dyn RegionIndex,
        fixtures: &FamilyFixtures,
        precision: PrecisionIndex,
        mode: InsertionMode,
    ) -> Result<(), ScenarioError> {
        let action = match mode {
            InsertionMode::Cells => actions::ADD_CELLS,
            InsertionMode::Tree => actions::ADD_TREE,
        };
        for region in &fixtures.regions {
            let cells = region.cells_at(precision);
            let started = Instant::now();
            let tx = match mode {
                InsertionMode::Cells => regions.add_region_cells(&region.name, cells).await?,
                InsertionMode::Tree => regions.add_region_tree(&region.name, cells).await?,
            };
            recorder
                .record(
                    RecordRequest::new(action, region.name.as_str())
                        .with_transaction(tx)
                        .timed_from(started),
                )
                .await?;
        }
        tracing::debug!(regions = fixtures.regions.len(), %mode, "regions registered");
        Ok(())
    }

    async fn interact_regions(
        &self,
        recorder: &MetricsRecorder,
        regions: &dyn RegionIndex,
        fixtures: &FamilyFixtures,
        interactions: &[RegionInteraction],
        precision: PrecisionIndex,
        supports_direct_cell_lookup: bool,
    ) -> Result<(), ScenarioError> {
        for interaction in interactions {
            for name in [&interaction.from, &interaction.to] {
                if fixtures.region(name).is_none() {
                    return Err(ScenarioError::fixture(format!(
                        "interaction references unknown region '{name}'"
                    )));
                }
            }

            let started = Instant::now();
            let tx = regions.interact(&interaction.from, &interaction.to).await?;
            recorder
                .record(
                    RecordRequest::new(actions::INTERACT, interaction.key())
                        .with_transaction(tx)
                        .timed_from(started),
                )
                .await?;

            if !supports_direct_cell_lookup {
                continue;
            }
            for cell in fixtures.lookup_cells_for(interaction, precision) {
                let started = Instant::now();
                let region = regions.region_of_cell(cell).await?;
                tracing::trace!(%cell, ?region, "cell resolved");
                recorder
                    .record(RecordRequest::new(actions::LOOKUP, cell.as_str()).timed_from(started))
                    .await?;
            }
        }
        tracing::debug!(
            interactions = interactions.len(),
            direct_lookup = supports_direct_cell_lookup,
            "region interactions done"
        );
        Ok(())
    }

    async fn register_devices(
        &self,
        recorder: &MetricsRecorder,
        devices: &dyn DeviceRegistry,
        fixtures: &FamilyFixtures,
        device_fixtures: &DeviceFixtures,
        owner: &Address,
    ) -> Result<(), ScenarioError> {
        for device in &device_fixtures.devices {
            if fixtures.region(&device.region).is_none() {
                return Err(ScenarioError::fixture(format!(
                    "device '{}' references unknown region '{}'",
                    device.id, device.region
                )));
            }
            let started = Instant::now();
            let tx = devices
                .register_device(&device.id, &device.region, owner)
                .await?;
            recorder
                .record(
                    RecordRequest::new(actions::REGISTER, device.id.as_str())
                        .with_transaction(tx)
                        .timed_from(started),
                )
                .await?;
        }
        tracing::debug!(devices = device_fixtures.devices.len(), %owner, "devices registered");
        Ok(())
    }

    async fn move_devices(
        &self,
        recorder: &MetricsRecorder,
        devices: &dyn DeviceRegistry,
        sub_accounts: &[Address],
        sub_locations: &[CellId],
        movements: &[DeviceMovement],
    ) -> Result<(), ScenarioError> {
        for movement in movements {
            let account = sub_accounts.get(movement.account_index).ok_or_else(|| {
                ScenarioError::fixture(format!(
                    "movement of '{}' uses sub-account #{} of {}",
                    movement.device,
                    movement.account_index,
                    sub_accounts.len()
                ))
            })?;
            let cell = sub_locations.get(movement.location_index).ok_or_else(|| {
                ScenarioError::fixture(format!(
                    "movement of '{}' uses sub-location #{} of {}",
                    movement.device,
                    movement.location_index,
                    sub_locations.len()
                ))
            })?;

            let started = Instant::now();
            let tx = devices.move_device(&movement.device, account, cell).await?;
            recorder
                .record(
                    RecordRequest::new(actions::MOVE, movement.device.as_str())
                        .with_transaction(tx)
                        .timed_from(started),
                )
                .await?;
        }
        tracing::debug!(movements = movements.len(), "device movements replayed");
        Ok(())
    }

    async fn manage_reputations(
        &self,
        recorder: &MetricsRecorder,
        reputation: &dyn ReputationManager,
        events: &[ReputationEvent],
        queries: &[ReputationQuery],
    ) -> Result<(), ScenarioError> {
        for event in events {
            let started = Instant::now();
            let tx = reputation.submit(event).await?;
            recorder
                .record(
                    RecordRequest::new(actions::SUBMIT, event.subject.as_str())
                        .with_transaction(tx)
                        .timed_from(started),
                )
                .await?;
        }
        for query in queries {
            let started = Instant::now();
            let score = reputation.reputation_of(&query.subject).await?;
            tracing::trace!(subject = %query.subject, score, "reputation queried");
            recorder
                .record(RecordRequest::new(actions::QUERY, query.subject.as_str()).timed_from(started))
                .await?;
        }
        tracing::debug!(events = events.len(), queries = queries.len(), "reputations managed");
        Ok(())
    }
}
