//! Testing utilities for regionbench workspace
//!
//! Shared test doubles, fixtures, and helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use regionbench_core::{
    Address, BlockInfo, CellId, Deployment, DeviceFixture, DeviceFixtures, DeviceMovement,
    DeviceRegistry, Family, FamilyFixtures, InputData, InsertionMode, LedgerClient,
    MetricsRecorder, PrecisionIndex, RecordRequest, RegionFixture, RegionIndex, RegionInteraction,
    RemoteError, ReputationEvent, ReputationManager, ReputationQuery, ScenarioError, ScenarioKind,
    ScenarioSuite, TransactionInfo, TxHash,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Gas charged for every transaction before per-item costs
pub const BASE_GAS: u64 = 21_000;
/// Gas charged per cell or item touched by a transaction
pub const ITEM_GAS: u64 = 5_000;

/// Which cost lookup the in-memory ledger should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFault {
    #[default]
    None,
    /// `transaction()` reports not found
    Transaction,
    /// `block()` reports not found
    Block,
    /// Transactions are reported without a block
    Pending,
}

#[derive(Debug, Clone)]
struct DeviceState {
    region: String,
    owner: Address,
    location: Option<CellId>,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: Vec<Address>,
    transactions: HashMap<TxHash, TransactionInfo>,
    blocks: BTreeMap<u64, BlockInfo>,
    regions: BTreeMap<String, Vec<CellId>>,
    interactions: Vec<(String, String)>,
    devices: HashMap<String, DeviceState>,
    reputations: HashMap<String, i64>,
    operations: Vec<String>,
    fault: LookupFault,
}

/// Automining in-memory ledger implementing every remote interface
///
/// Each state-changing call is mined into its own block.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new(account_count: usize) -> Self {
        let accounts = (0..account_count)
            .map(|i| Address::new(format!("0x{:040x}", i + 1)))
            .collect();
        Self {
            state: Mutex::new(LedgerState {
                accounts,
                ..LedgerState::default()
            }),
        }
    }

    pub fn with_fault(self, fault: LookupFault) -> Self {
        self.state.lock().fault = fault;
        self
    }

    pub fn set_fault(&self, fault: LookupFault) {
        self.state.lock().fault = fault;
    }

    /// Mine a transaction outside of any service call
    pub fn mine(&self, label: &str, items: u64) -> TxHash {
        mine(&mut self.state.lock(), label, items)
    }

    pub fn accounts_snapshot(&self) -> Vec<Address> {
        self.state.lock().accounts.clone()
    }

    /// Labels of every mined transaction, in order
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().operations.clone()
    }

    pub fn region_cells(&self, name: &str) -> Option<Vec<CellId>> {
        self.state.lock().regions.get(name).cloned()
    }

    pub fn device_location(&self, device: &str) -> Option<CellId> {
        self.state
            .lock()
            .devices
            .get(device)
            .and_then(|d| d.location.clone())
    }

    pub fn device_region(&self, device: &str) -> Option<String> {
        self.state.lock().devices.get(device).map(|d| d.region.clone())
    }

    pub fn device_owner(&self, device: &str) -> Option<Address> {
        self.state.lock().devices.get(device).map(|d| d.owner.clone())
    }

    pub fn interaction_count(&self) -> usize {
        self.state.lock().interactions.len()
    }
}

fn mine(state: &mut LedgerState, label: &str, items: u64) -> TxHash {
    let number = state.blocks.len() as u64 + 1;
    let hash = TxHash::new(format!("0x{number:064x}"));
    let gas = BASE_GAS + ITEM_GAS * items;
    state.transactions.insert(
        hash.clone(),
        TransactionInfo {
            hash: hash.clone(),
            gas,
            block_number: Some(number),
        },
    );
    state.blocks.insert(
        number,
        BlockInfo {
            number,
            gas_used: gas - gas / 10,
        },
    );
    state.operations.push(label.to_string());
    hash
}

fn reverted(message: impl Into<String>) -> RemoteError {
    RemoteError::Rpc {
        code: -32000,
        message: message.into(),
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn accounts(&self) -> Result<Vec<Address>, RemoteError> {
        Ok(self.state.lock().accounts.clone())
    }

    async fn transaction(&self, hash: &TxHash) -> Result<TransactionInfo, RemoteError> {
        let state = self.state.lock();
        if state.fault == LookupFault::Transaction {
            return Err(RemoteError::not_found(format!("transaction {hash}")));
        }
        let mut tx = state
            .transactions
            .get(hash)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(format!("transaction {hash}")))?;
        if state.fault == LookupFault::Pending {
            tx.block_number = None;
        }
        Ok(tx)
    }

    async fn block(&self, number: u64) -> Result<BlockInfo, RemoteError> {
        let state = self.state.lock();
        if state.fault == LookupFault::Block {
            return Err(RemoteError::not_found(format!("block {number}")));
        }
        state
            .blocks
            .get(&number)
            .copied()
            .ok_or_else(|| RemoteError::not_found(format!("block {number}")))
    }
}

#[async_trait]
impl RegionIndex for InMemoryLedger {
    async fn add_region_cells(&self, name: &str, cells: &[CellId]) -> Result<TxHash, RemoteError> {
        let mut state = self.state.lock();
        state.regions.insert(name.to_string(), cells.to_vec());
        Ok(mine(&mut state, "regions.addCells", cells.len() as u64))
    }

    async fn add_region_tree(&self, name: &str, cells: &[CellId]) -> Result<TxHash, RemoteError> {
        let mut state = self.state.lock();
        state.regions.insert(name.to_string(), cells.to_vec());
        Ok(mine(&mut state, "regions.addTree", 1 + cells.len() as u64 / 2))
    }

    async fn interact(&self, from: &str, to: &str) -> Result<TxHash, RemoteError> {
        let mut state = self.state.lock();
        for name in [from, to] {
            if !state.regions.contains_key(name) {
                return Err(reverted(format!("unknown region {name}")));
            }
        }
        state.interactions.push((from.to_string(), to.to_string()));
        Ok(mine(&mut state, "regions.interact", 1))
    }

    async fn region_of_cell(&self, cell: &str) -> Result<Option<String>, RemoteError> {
        let state = self.state.lock();
        Ok(state
            .regions
            .iter()
            .find(|(_, cells)| cells.iter().any(|c| cell.starts_with(c.as_str())))
            .map(|(name, _)| name.clone()))
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryLedger {
    async fn register_device(
        &self,
        device: &str,
        region: &str,
        owner: &Address,
    ) -> Result<TxHash, RemoteError> {
        let mut state = self.state.lock();
        if !state.regions.contains_key(region) {
            return Err(reverted(format!("unknown region {region}")));
        }
        state.devices.insert(
            device.to_string(),
            DeviceState {
                region: region.to_string(),
                owner: owner.clone(),
                location: None,
            },
        );
        Ok(mine(&mut state, "devices.register", 1))
    }

    async fn move_device(
        &self,
        device: &str,
        _account: &Address,
        cell: &str,
    ) -> Result<TxHash, RemoteError> {
        let mut state = self.state.lock();
        state
            .devices
            .get_mut(device)
            .ok_or_else(|| reverted(format!("unknown device {device}")))?
            .location = Some(cell.to_string());
        Ok(mine(&mut state, "devices.move", 1))
    }
}

#[async_trait]
impl ReputationManager for InMemoryLedger {
    async fn submit(&self, event: &ReputationEvent) -> Result<TxHash, RemoteError> {
        let mut state = self.state.lock();
        *state.reputations.entry(event.subject.clone()).or_default() += event.score;
        Ok(mine(&mut state, "reputation.submit", 1))
    }

    async fn reputation_of(&self, subject: &str) -> Result<i64, RemoteError> {
        Ok(self
            .state
            .lock()
            .reputations
            .get(subject)
            .copied()
            .unwrap_or_default())
    }
}

/// Deployment whose every handle is the same in-memory ledger
pub fn in_memory_deployment(ledger: Arc<InMemoryLedger>) -> Deployment {
    Deployment {
        client: ledger.clone(),
        regions: ledger.clone(),
        devices: ledger.clone(),
        reputation: ledger,
    }
}

/// Arguments observed by [`RecordingSuite`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioCall {
    RegisterRegions {
        precision: u8,
        mode: InsertionMode,
        regions: usize,
    },
    InteractRegions {
        precision: u8,
        direct_lookup: bool,
        interactions: usize,
    },
    RegisterDevices {
        owner: Address,
        devices: usize,
    },
    MoveDevices {
        sub_accounts: usize,
        sub_locations: usize,
        movements: usize,
    },
    ManageReputations {
        events: usize,
        queries: usize,
    },
}

impl ScenarioCall {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Self::RegisterRegions { .. } => ScenarioKind::RegionRegistration,
            Self::InteractRegions { .. } => ScenarioKind::RegionInteraction,
            Self::RegisterDevices { .. } => ScenarioKind::DeviceRegistration,
            Self::MoveDevices { .. } => ScenarioKind::DeviceMovement,
            Self::ManageReputations { .. } => ScenarioKind::Reputation,
        }
    }
}

/// Suite that records its invocations and writes one bare row per scenario
#[derive(Debug, Default)]
pub struct RecordingSuite {
    calls: Mutex<Vec<ScenarioCall>>,
    fail_at: Option<ScenarioKind>,
}

impl RecordingSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with a fixture error when `kind` runs
    pub fn failing_at(kind: ScenarioKind) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: Some(kind),
        }
    }

    pub fn calls(&self) -> Vec<ScenarioCall> {
        self.calls.lock().clone()
    }

    pub fn executed(&self) -> Vec<ScenarioKind> {
        self.calls.lock().iter().map(ScenarioCall::kind).collect()
    }

    async fn observe(
        &self,
        recorder: &MetricsRecorder,
        call: ScenarioCall,
    ) -> Result<(), ScenarioError> {
        let kind = call.kind();
        self.calls.lock().push(call);
        if self.fail_at == Some(kind) {
            return Err(ScenarioError::fixture(format!("injected failure in {kind}")));
        }
        recorder
            .record(RecordRequest::new(kind.label(), "observed"))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ScenarioSuite for RecordingSuite {
    async fn register_regions(
        &self,
        recorder: &MetricsRecorder,
        _regions: &dyn RegionIndex,
        fixtures: &FamilyFixtures,
        precision: PrecisionIndex,
        mode: InsertionMode,
    ) -> Result<(), ScenarioError> {
        let call = ScenarioCall::RegisterRegions {
            precision: precision.get(),
            mode,
            regions: fixtures.regions.len(),
        };
        self.observe(recorder, call).await
    }

    async fn interact_regions(
        &self,
        recorder: &MetricsRecorder,
        _regions: &dyn RegionIndex,
        _fixtures: &FamilyFixtures,
        interactions: &[RegionInteraction],
        precision: PrecisionIndex,
        supports_direct_cell_lookup: bool,
    ) -> Result<(), ScenarioError> {
        let call = ScenarioCall::InteractRegions {
            precision: precision.get(),
            direct_lookup: supports_direct_cell_lookup,
            interactions: interactions.len(),
        };
        self.observe(recorder, call).await
    }

    async fn register_devices(
        &self,
        recorder: &MetricsRecorder,
        _devices: &dyn DeviceRegistry,
        _fixtures: &FamilyFixtures,
        device_fixtures: &DeviceFixtures,
        owner: &Address,
    ) -> Result<(), ScenarioError> {
        let call = ScenarioCall::RegisterDevices {
            owner: owner.clone(),
            devices: device_fixtures.devices.len(),
        };
        self.observe(recorder, call).await
    }

    async fn move_devices(
        &self,
        recorder: &MetricsRecorder,
        _devices: &dyn DeviceRegistry,
        sub_accounts: &[Address],
        sub_locations: &[CellId],
        movements: &[DeviceMovement],
    ) -> Result<(), ScenarioError> {
        let call = ScenarioCall::MoveDevices {
            sub_accounts: sub_accounts.len(),
            sub_locations: sub_locations.len(),
            movements: movements.len(),
        };
        self.observe(recorder, call).await
    }

    async fn manage_reputations(
        &self,
        recorder: &MetricsRecorder,
        _reputation: &dyn ReputationManager,
        events: &[ReputationEvent],
        queries: &[ReputationQuery],
    ) -> Result<(), ScenarioError> {
        let call = ScenarioCall::ManageReputations {
            events: events.len(),
            queries: queries.len(),
        };
        self.observe(recorder, call).await
    }
}

fn tiers(base: &str) -> [Vec<CellId>; 3] {
    [
        vec![base.to_string()],
        vec![format!("{base}0"), format!("{base}1")],
        vec![format!("{base}00"), format!("{base}01"), format!("{base}10")],
    ]
}

fn family_fixtures(prefix: &str) -> FamilyFixtures {
    let regions = ["harbor", "market", "campus"]
        .iter()
        .enumerate()
        .map(|(i, name)| RegionFixture {
            name: (*name).to_string(),
            cells: tiers(&format!("{prefix}{i}")),
        })
        .collect();
    // harbor-market looks up one cell inside harbor and one outside every region;
    // market-campus has none
    let mut lookup_cells = BTreeMap::new();
    lookup_cells.insert(
        "harbor-market".to_string(),
        [
            vec![format!("{prefix}0")],
            vec![format!("{prefix}00"), format!("{prefix}9")],
            vec![format!("{prefix}000")],
        ],
    );
    FamilyFixtures {
        regions,
        lookup_cells,
        sub_locations: vec![format!("{prefix}00"), format!("{prefix}10"), format!("{prefix}20")],
        device_movements: vec![
            DeviceMovement {
                device: "dev-1".into(),
                account_index: 0,
                location_index: 1,
            },
            DeviceMovement {
                device: "dev-2".into(),
                account_index: 1,
                location_index: 2,
            },
            DeviceMovement {
                device: "dev-1".into(),
                account_index: 0,
                location_index: 0,
            },
        ],
    }
}

/// Small but complete fixture set covering both families
pub fn sample_input_data() -> InputData {
    let mut families = BTreeMap::new();
    families.insert(Family::GeohashRegions, family_fixtures("u4p"));
    families.insert(Family::S2Regions, family_fixtures("47a"));

    InputData {
        families,
        region_interactions: vec![
            RegionInteraction {
                from: "harbor".into(),
                to: "market".into(),
            },
            RegionInteraction {
                from: "market".into(),
                to: "campus".into(),
            },
        ],
        devices: DeviceFixtures {
            devices: vec![
                DeviceFixture {
                    id: "dev-1".into(),
                    region: "harbor".into(),
                },
                DeviceFixture {
                    id: "dev-2".into(),
                    region: "campus".into(),
                },
            ],
            sub_accounts: vec![Address::new("0xa11ce"), Address::new("0xb0b")],
        },
        reputations: vec![
            ReputationEvent {
                subject: "dev-1".into(),
                reporter: "dev-2".into(),
                score: 3,
            },
            ReputationEvent {
                subject: "dev-2".into(),
                reporter: "dev-1".into(),
                score: -1,
            },
        ],
        reputation_queries: vec![
            ReputationQuery {
                subject: "dev-1".into(),
            },
            ReputationQuery {
                subject: "dev-2".into(),
            },
        ],
    }
}

/// Read an output file as lines
pub async fn read_lines(path: impl AsRef<Path>) -> Vec<String> {
    tokio::fs::read_to_string(path)
        .await
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Split a data line into its five columns
pub fn columns(line: &str) -> Vec<&str> {
    line.split(',').collect()
}
