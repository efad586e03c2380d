//! regionbench remote - JSON-RPC access to the benchmarked deployment
//!
//! Provides:
//! - [`JsonRpcClient`], a JSON-RPC 2.0 client over HTTP that also implements
//!   [`regionbench_core::LedgerClient`] via the `eth_*` namespace
//! - Handles for the region index, device registry and reputation manager

#![warn(unreachable_pub)]

mod ledger;
mod rpc;
mod services;

pub use rpc::JsonRpcClient;
pub use services::{RpcDeviceRegistry, RpcRegionIndex, RpcReputationManager};

use regionbench_core::{Address, Deployment, RemoteError};
use std::sync::Arc;
use std::time::Duration;

/// Addresses of the deployed services
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceAddresses {
    /// Region index under benchmark
    pub regions: Address,
    /// Device registry
    pub devices: Address,
    /// Reputation manager
    pub reputation: Address,
}

/// Connect every handle of a [`Deployment`] to one JSON-RPC endpoint
pub fn connect(
    url: &str,
    timeout: Option<Duration>,
    addresses: ServiceAddresses,
) -> Result<Deployment, RemoteError> {
    let rpc = Arc::new(JsonRpcClient::with_timeout(url, timeout)?);
    tracing::info!(url, "ledger endpoint configured");
    Ok(Deployment {
        client: rpc.clone(),
        regions: Arc::new(RpcRegionIndex::new(rpc.clone(), addresses.regions)),
        devices: Arc::new(RpcDeviceRegistry::new(rpc.clone(), addresses.devices)),
        reputation: Arc::new(RpcReputationManager::new(rpc, addresses.reputation)),
    })
}
