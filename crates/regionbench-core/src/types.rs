//! Core types for regionbench
//!
//! Defines the identifiers exchanged with the remote deployment, the fixed
//! sequence of benchmark scenarios, and the fixture data consumed by them.

use crate::config::{Family, PrecisionIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Transaction hash as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    /// Wrap a raw hash
    #[inline]
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Raw hash string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger account or service address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    /// Wrap a raw address
    #[inline]
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Raw address string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Benchmarked category of operations, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Regions are added to the index
    RegionRegistration,
    /// Regions interact with each other and cells are resolved
    RegionInteraction,
    /// Devices are registered into regions
    DeviceRegistration,
    /// Devices move between locations in bulk
    DeviceMovement,
    /// Reputation events are submitted and queried
    Reputation,
}

impl ScenarioKind {
    /// Fixed execution order
    pub const ALL: [ScenarioKind; 5] = [
        ScenarioKind::RegionRegistration,
        ScenarioKind::RegionInteraction,
        ScenarioKind::DeviceRegistration,
        ScenarioKind::DeviceMovement,
        ScenarioKind::Reputation,
    ];

    /// Position in the execution order
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short label used in logs
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RegionRegistration => "region-registration",
            Self::RegionInteraction => "region-interaction",
            Self::DeviceRegistration => "device-registration",
            Self::DeviceMovement => "device-movement",
            Self::Reputation => "reputation",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cell identifier in the family's coordinate system
pub type CellId = String;

/// One region with its cell cover at every precision tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionFixture {
    /// Region name
    pub name: String,
    /// Cell cover per tier, coarsest first
    pub cells: [Vec<CellId>; 3],
}

impl RegionFixture {
    /// Cells at the given tier
    #[inline]
    #[must_use]
    pub fn cells_at(&self, precision: PrecisionIndex) -> &[CellId] {
        &self.cells[precision.as_usize()]
    }
}

/// Movement of one device to a sub-location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMovement {
    /// Device identifier
    pub device: String,
    /// Index into the sub-account list
    pub account_index: usize,
    /// Index into the family's sub-locations
    pub location_index: usize,
}

/// Fixture bundle for one family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyFixtures {
    /// Regions to register
    pub regions: Vec<RegionFixture>,
    /// Cells devices move between
    pub sub_locations: Vec<CellId>,
    /// Bulk movement sequence
    pub device_movements: Vec<DeviceMovement>,
    /// Cells resolved after each interaction, keyed by [`RegionInteraction::key`]
    pub lookup_cells: BTreeMap<String, [Vec<CellId>; 3]>,
}

impl FamilyFixtures {
    /// Find a region by name
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&RegionFixture> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Cells to resolve after `interaction` at the given tier
    #[must_use]
    pub fn lookup_cells_for(
        &self,
        interaction: &RegionInteraction,
        precision: PrecisionIndex,
    ) -> &[CellId] {
        self.lookup_cells
            .get(&interaction.key())
            .map_or(&[][..], |tiers| tiers[precision.as_usize()].as_slice())
    }
}

/// Pair of regions that interact
///
/// Region names are shared by both families. The cells looked up afterwards are
/// not, so they live in [`FamilyFixtures::lookup_cells`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInteraction {
    /// Initiating region
    pub from: String,
    /// Target region
    pub to: String,
}

impl RegionInteraction {
    /// `<from>-<to>`, used as the row attribute and the lookup-cell key
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

/// Device registered into a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFixture {
    /// Device identifier
    pub id: String,
    /// Region the device belongs to
    pub region: String,
}

/// Device fixtures shared by all families
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceFixtures {
    /// Devices to register
    pub devices: Vec<DeviceFixture>,
    /// Accounts that move devices around
    pub sub_accounts: Vec<Address>,
}

/// Reputation report about a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationEvent {
    /// Subject being rated
    pub subject: String,
    /// Reporting party
    pub reporter: String,
    /// Signed score delta
    pub score: i64,
}

/// Reputation lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationQuery {
    /// Subject to look up
    pub subject: String,
}

/// Complete fixture set for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputData {
    /// Per-family bundles
    pub families: BTreeMap<Family, FamilyFixtures>,
    /// Region interactions
    pub region_interactions: Vec<RegionInteraction>,
    /// Devices and sub-accounts
    pub devices: DeviceFixtures,
    /// Reputation events to submit
    pub reputations: Vec<ReputationEvent>,
    /// Reputation queries to run after the events
    pub reputation_queries: Vec<ReputationQuery>,
}

impl InputData {
    /// Fixture bundle for a family
    #[inline]
    #[must_use]
    pub fn family(&self, family: Family) -> Option<&FamilyFixtures> {
        self.families.get(&family)
    }

    /// First name or cell id that would break a CSV row
    ///
    /// Covers every string that ends up in the `attribute` column.
    #[must_use]
    pub fn find_unsafe_label(&self) -> Option<&str> {
        let families = self.families.values().flat_map(|f| {
            let regions = f.regions.iter().map(|r| r.name.as_str());
            let moved = f.device_movements.iter().map(|m| m.device.as_str());
            let lookups = f
                .lookup_cells
                .values()
                .flat_map(|tiers| tiers.iter().flatten())
                .map(String::as_str);
            regions.chain(moved).chain(lookups)
        });
        let interactions = self
            .region_interactions
            .iter()
            .flat_map(|i| [i.from.as_str(), i.to.as_str()]);
        let devices = self.devices.devices.iter().map(|d| d.id.as_str());
        let subjects = self
            .reputations
            .iter()
            .map(|e| e.subject.as_str())
            .chain(self.reputation_queries.iter().map(|q| q.subject.as_str()));

        families
            .chain(interactions)
            .chain(devices)
            .chain(subjects)
            .find(|label| label.contains([',', '\n', '\r']))
    }
}
