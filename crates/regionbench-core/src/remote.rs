//! Interfaces of the remote deployment
//!
//! The benchmark drives three deployed services plus the ledger client used to
//! resolve cost metrics. Implementations live outside this crate.

use crate::error::RemoteError;
use crate::types::{Address, CellId, ReputationEvent, TxHash};
use async_trait::async_trait;
use std::sync::Arc;

/// Transaction metadata needed for cost accounting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    /// Transaction hash
    pub hash: TxHash,
    /// Gas allotted to the transaction
    pub gas: u64,
    /// Enclosing block, `None` while pending
    pub block_number: Option<u64>,
}

/// Block metadata needed for cost accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Block number
    pub number: u64,
    /// Aggregate gas used by the block
    pub gas_used: u64,
}

/// Ledger client
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Accounts available for signing
    async fn accounts(&self) -> Result<Vec<Address>, RemoteError>;

    /// Fetch a transaction by hash
    async fn transaction(&self, hash: &TxHash) -> Result<TransactionInfo, RemoteError>;

    /// Fetch a block by number
    async fn block(&self, number: u64) -> Result<BlockInfo, RemoteError>;
}

/// Deployed region index
#[async_trait]
pub trait RegionIndex: Send + Sync {
    /// Add a region cell by cell
    async fn add_region_cells(&self, name: &str, cells: &[CellId]) -> Result<TxHash, RemoteError>;

    /// Add a region through the hierarchical batch structure
    async fn add_region_tree(&self, name: &str, cells: &[CellId]) -> Result<TxHash, RemoteError>;

    /// Record an interaction between two regions
    async fn interact(&self, from: &str, to: &str) -> Result<TxHash, RemoteError>;

    /// Resolve the region containing a cell (read-only)
    async fn region_of_cell(&self, cell: &str) -> Result<Option<String>, RemoteError>;
}

/// Deployed device registry
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Register a device into a region on behalf of `owner`
    async fn register_device(
        &self,
        device: &str,
        region: &str,
        owner: &Address,
    ) -> Result<TxHash, RemoteError>;

    /// Move a device to a cell, sent from `account`
    async fn move_device(
        &self,
        device: &str,
        account: &Address,
        cell: &str,
    ) -> Result<TxHash, RemoteError>;
}

/// Deployed reputation manager
#[async_trait]
pub trait ReputationManager: Send + Sync {
    /// Submit a reputation event
    async fn submit(&self, event: &ReputationEvent) -> Result<TxHash, RemoteError>;

    /// Current reputation of a subject (read-only)
    async fn reputation_of(&self, subject: &str) -> Result<i64, RemoteError>;
}

/// Handles to everything a run talks to
#[derive(Clone)]
pub struct Deployment {
    /// Ledger client for accounts and cost lookups
    pub client: Arc<dyn LedgerClient>,
    /// Region index under benchmark
    pub regions: Arc<dyn RegionIndex>,
    /// Device registry
    pub devices: Arc<dyn DeviceRegistry>,
    /// Reputation manager
    pub reputation: Arc<dyn ReputationManager>,
}

impl std::fmt::Debug for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployment").finish_non_exhaustive()
    }
}
