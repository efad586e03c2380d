//! Service handles backed by the JSON-RPC facade of the deployment
//!
//! Each operation maps to a `<namespace>_<operation>` method whose first
//! parameter is the deployed service address. State-changing operations
//! return the transaction hash.

use crate::ledger::Quantity;
use crate::rpc::JsonRpcClient;
use async_trait::async_trait;
use regionbench_core::{
    Address, CellId, DeviceRegistry, RegionIndex, RemoteError, ReputationEvent,
    ReputationManager, TxHash,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ServiceEndpoint {
    rpc: Arc<JsonRpcClient>,
    namespace: &'static str,
    address: Address,
}

impl ServiceEndpoint {
    fn method(&self, operation: &str) -> String {
        format!("{}_{}", self.namespace, operation)
    }

    /// Prepend the service address to `args`
    fn params(&self, args: Vec<Value>) -> Value {
        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(json!(self.address));
        params.extend(args);
        Value::Array(params)
    }

    async fn transact(&self, operation: &str, args: Vec<Value>) -> Result<TxHash, RemoteError> {
        self.rpc.call(&self.method(operation), self.params(args)).await
    }

    async fn query<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        args: Vec<Value>,
    ) -> Result<Option<T>, RemoteError> {
        self.rpc
            .call_optional(&self.method(operation), self.params(args))
            .await
    }
}

/// Region index handle
#[derive(Debug, Clone)]
pub struct RpcRegionIndex {
    endpoint: ServiceEndpoint,
}

impl RpcRegionIndex {
    /// Bind to the region index deployed at `address`
    #[must_use]
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self {
            endpoint: ServiceEndpoint {
                rpc,
                namespace: "regions",
                address,
            },
        }
    }
}

#[async_trait]
impl RegionIndex for RpcRegionIndex {
    async fn add_region_cells(&self, name: &str, cells: &[CellId]) -> Result<TxHash, RemoteError> {
        self.endpoint
            .transact("addCells", vec![json!(name), json!(cells)])
            .await
    }

    async fn add_region_tree(&self, name: &str, cells: &[CellId]) -> Result<TxHash, RemoteError> {
        self.endpoint
            .transact("addTree", vec![json!(name), json!(cells)])
            .await
    }

    async fn interact(&self, from: &str, to: &str) -> Result<TxHash, RemoteError> {
        self.endpoint
            .transact("interact", vec![json!(from), json!(to)])
            .await
    }

    async fn region_of_cell(&self, cell: &str) -> Result<Option<String>, RemoteError> {
        self.endpoint.query("regionOfCell", vec![json!(cell)]).await
    }
}

/// Device registry handle
#[derive(Debug, Clone)]
pub struct RpcDeviceRegistry {
    endpoint: ServiceEndpoint,
}

impl RpcDeviceRegistry {
    /// Bind to the device registry deployed at `address`
    #[must_use]
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self {
            endpoint: ServiceEndpoint {
                rpc,
                namespace: "devices",
                address,
            },
        }
    }
}

#[async_trait]
impl DeviceRegistry for RpcDeviceRegistry {
    async fn register_device(
        &self,
        device: &str,
        region: &str,
        owner: &Address,
    ) -> Result<TxHash, RemoteError> {
        self.endpoint
            .transact("register", vec![json!(device), json!(region), json!(owner)])
            .await
    }

    async fn move_device(
        &self,
        device: &str,
        account: &Address,
        cell: &str,
    ) -> Result<TxHash, RemoteError> {
        self.endpoint
            .transact("move", vec![json!(device), json!(account), json!(cell)])
            .await
    }
}

/// Reputation manager handle
#[derive(Debug, Clone)]
pub struct RpcReputationManager {
    endpoint: ServiceEndpoint,
}

impl RpcReputationManager {
    /// Bind to the reputation manager deployed at `address`
    #[must_use]
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self {
            endpoint: ServiceEndpoint {
                rpc,
                namespace: "reputation",
                address,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Score {
    Signed(i64),
    Quantity(Quantity),
}

#[async_trait]
impl ReputationManager for RpcReputationManager {
    async fn submit(&self, event: &ReputationEvent) -> Result<TxHash, RemoteError> {
        self.endpoint
            .transact(
                "submit",
                vec![json!(event.subject), json!(event.reporter), json!(event.score)],
            )
            .await
    }

    async fn reputation_of(&self, subject: &str) -> Result<i64, RemoteError> {
        let score: Score = self
            .endpoint
            .query("of", vec![json!(subject)])
            .await?
            .ok_or_else(|| RemoteError::not_found(format!("reputation of {subject}")))?;
        match score {
            Score::Signed(value) => Ok(value),
            Score::Quantity(q) => i64::try_from(q.to_u64()?)
                .map_err(|_| RemoteError::decode(format!("reputation of {subject} overflows i64"))),
        }
    }
}
