//! Ledger client over the standard `eth_*` JSON-RPC namespace

use crate::rpc::JsonRpcClient;
use async_trait::async_trait;
use regionbench_core::{Address, BlockInfo, LedgerClient, RemoteError, TransactionInfo, TxHash};
use serde::Deserialize;
use serde_json::json;

/// Integer quantity, either `0x`-prefixed hex or a plain JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Quantity {
    Number(u64),
    Hex(String),
}

impl Quantity {
    pub(crate) fn to_u64(&self) -> Result<u64, RemoteError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Hex(s) => parse_hex_quantity(s),
        }
    }
}

/// Decode a `0x`-prefixed hex quantity
pub(crate) fn parse_hex_quantity(s: &str) -> Result<u64, RemoteError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| RemoteError::decode(format!("quantity without 0x prefix: '{s}'")))?;
    if digits.is_empty() {
        return Err(RemoteError::decode("empty quantity"));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| RemoteError::decode(format!("invalid quantity '{s}': {e}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    hash: TxHash,
    gas: Quantity,
    #[serde(default)]
    block_number: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    number: Quantity,
    gas_used: Quantity,
}

#[async_trait]
impl LedgerClient for JsonRpcClient {
    async fn accounts(&self) -> Result<Vec<Address>, RemoteError> {
        self.call("eth_accounts", json!([])).await
    }

    async fn transaction(&self, hash: &TxHash) -> Result<TransactionInfo, RemoteError> {
        let raw: RawTransaction = self
            .call_optional("eth_getTransactionByHash", json!([hash]))
            .await?
            .ok_or_else(|| RemoteError::not_found(format!("transaction {hash}")))?;
        Ok(TransactionInfo {
            hash: raw.hash,
            gas: raw.gas.to_u64()?,
            block_number: raw.block_number.as_ref().map(Quantity::to_u64).transpose()?,
        })
    }

    async fn block(&self, number: u64) -> Result<BlockInfo, RemoteError> {
        let raw: RawBlock = self
            .call_optional("eth_getBlockByNumber", json!([format!("{number:#x}"), false]))
            .await?
            .ok_or_else(|| RemoteError::not_found(format!("block {number}")))?;
        Ok(BlockInfo {
            number: raw.number.to_u64()?,
            gas_used: raw.gas_used.to_u64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_quantities() {
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x5208").unwrap(), 21_000);
        assert_eq!(parse_hex_quantity("0X6691B7").unwrap(), 6_721_975);
    }

    #[test]
    fn malformed_quantities_rejected() {
        for bad in ["5208", "0x", "0xzz", "0x1ffffffffffffffff"] {
            assert!(
                matches!(parse_hex_quantity(bad), Err(RemoteError::Decode(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn raw_transaction_accepts_both_quantity_forms() {
        let pending: RawTransaction =
            serde_json::from_str(r#"{"hash":"0xab","gas":90000,"blockNumber":null}"#).unwrap();
        assert_eq!(pending.gas.to_u64().unwrap(), 90_000);
        assert!(pending.block_number.is_none());

        let mined: RawTransaction =
            serde_json::from_str(r#"{"hash":"0xab","gas":"0x15f90","blockNumber":"0x1b4","nonce":"0x0"}"#)
                .unwrap();
        assert_eq!(mined.gas.to_u64().unwrap(), 90_000);
        assert_eq!(mined.block_number.unwrap().to_u64().unwrap(), 436);
    }
}
