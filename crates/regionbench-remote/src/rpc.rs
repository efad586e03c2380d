//! JSON-RPC 2.0 transport over HTTP

use regionbench_core::RemoteError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcResponse {
    /// `Ok(None)` for a `null` result
    pub(crate) fn into_result<T: DeserializeOwned>(self) -> Result<Option<T>, RemoteError> {
        if let Some(error) = self.error {
            return Err(RemoteError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        if self.result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(self.result)
            .map(Some)
            .map_err(|e| RemoteError::decode(e.to_string()))
    }
}

/// JSON-RPC client bound to one endpoint
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Client without a request timeout
    pub fn new(url: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(url, None)
    }

    /// Client with an optional per-request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method`, treating a `null` result as not found
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RemoteError> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| RemoteError::not_found(format!("{method} returned null")))
    }

    /// Call `method`, returning `None` for a `null` result
    pub async fn call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, RemoteError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(target: "regionbench::rpc", method, id, "rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(target: "regionbench::rpc", method, id, %status, "rpc non-success status");
            return Err(RemoteError::Status(status.as_u16()));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::decode(e.to_string()))?;
        envelope.into_result().map_err(|e| {
            tracing::debug!(target: "regionbench::rpc", method, id, error = %e, "rpc call failed");
            e
        })
    }
}
