//! JSON-RPC reads and raw transaction submission.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint (primary + failovers)
//! - Query chain state (block number, raw blocks, storage, code, receipts)
//! - Simulate calls and estimate gas
//! - Submit raw signed transactions
//! - Bound every request by the profile's RPC timeout

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::config::validation::validate_rpc_url;

/// Try `$call` on every provider in order, returning the first success or
/// the last provider's error.
macro_rules! failover {
    ($self:ident, $what:literal, |$p:ident| $call:expr) => {{
        let mut result = Err(BlockchainError::Rpc(concat!("no provider to ", $what).to_string()));
        for (i, $p) in $self.providers.iter().enumerate() {
            match timeout($self.timeout_duration, $call).await {
                Ok(Ok(value)) => {
                    result = Ok(value);
                    break;
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, request = $what, error = %e, "RPC error");
                    result = Err(BlockchainError::Rpc(e.to_string()));
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, request = $what, "RPC timeout");
                    result = Err(BlockchainError::Timeout($self.config.rpc_timeout_secs));
                }
            }
        }
        result
    }};
}

/// Read client over the primary RPC URL plus its failovers.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Primary first, then failovers in config order.
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    config: BlockchainConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Connect lazily to the profile's RPC URLs.
    ///
    /// No request is sent; use [`verify_chain_id`](Self::verify_chain_id)
    /// to check connectivity.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers: Vec<Arc<dyn Provider + Send + Sync>> = Vec::new();

        let primary_url = validate_rpc_url(&config.rpc_url).map_err(BlockchainError::Rpc)?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)));

        for url_str in &config.failover_urls {
            match validate_rpc_url(url_str) {
                Ok(url) => providers.push(Arc::new(ProviderBuilder::new().connect_http(url))),
                Err(e) => tracing::warn!(url = %url_str, error = %e, "Ignoring invalid failover RPC URL"),
            }
        }

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Fail with `ChainMismatch` when the node serves another chain.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        tracing::info!(
            rpc_url = %self.config.rpc_url,
            chain_id = chain_id.0,
            "Connected to chain"
        );
        Ok(())
    }

    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        failover!(self, "get chain id", |p| p.get_chain_id()).map(ChainId)
    }

    /// Current head.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        failover!(self, "get block number", |p| p.get_block_number())
    }

    /// Raw `eth_getBlockByNumber` object, without transaction bodies.
    ///
    /// Left untyped so chains with extra or missing header keys still reach
    /// [`HeaderFields::from_json`](crate::header::HeaderFields::from_json).
    pub async fn get_block(&self, number: u64) -> BlockchainResult<Value> {
        let params = (BlockNumberOrTag::Number(number), false);
        let block: Value = failover!(self, "get block", |p| p
            .client()
            .request::<_, Value>("eth_getBlockByNumber", params))?;

        if block.is_null() {
            return Err(BlockchainError::BlockNotFound(number));
        }
        Ok(block)
    }

    /// Read a raw storage slot.
    pub async fn get_storage_at(&self, address: Address, slot: U256) -> BlockchainResult<B256> {
        failover!(self, "get storage", |p| p.get_storage_at(address, slot))
            .map(|value| B256::from(value.to_be_bytes::<32>()))
    }

    /// Get the deployed code at an address.
    pub async fn get_code(&self, address: Address) -> BlockchainResult<Bytes> {
        failover!(self, "get code", |p| p.get_code_at(address))
    }

    /// Execute a read-only call against the latest state.
    pub async fn call(&self, tx: &TransactionRequest) -> BlockchainResult<Bytes> {
        failover!(self, "call", |p| p.call(tx.clone()))
    }

    /// Estimate gas for a transaction; a revert surfaces here.
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        failover!(self, "estimate gas", |p| p.estimate_gas(tx.clone()))
    }

    /// Pending nonce of `address`.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        failover!(self, "get transaction count", |p| p.get_transaction_count(address))
    }

    /// Gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        failover!(self, "get gas price", |p| p.get_gas_price())
    }

    /// Submit a signed, EIP-2718 encoded transaction.
    ///
    /// Only the primary provider is used, so a transaction is never
    /// broadcast twice through different nodes.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let fut = self.provider().send_raw_transaction(raw);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        failover!(self, "get receipt", |p| p.get_transaction_receipt(tx_hash))
    }

    /// Poll until the head is at least `target`.
    ///
    /// Polls at a fixed interval with no backoff. A `target` beyond
    /// `deadline` can never be reached in time and fails with
    /// `DeadlineExceeded` before any request is sent.
    pub async fn wait_for_block(
        &self,
        target: u64,
        deadline: u64,
        poll_interval: Duration,
    ) -> BlockchainResult<u64> {
        if target > deadline {
            return Err(BlockchainError::DeadlineExceeded { target, deadline });
        }
        loop {
            let head = self.get_block_number().await?;
            if head >= target {
                return Ok(head);
            }
            tracing::debug!(head, target, "Waiting for block");
            sleep(poll_interval).await;
        }
    }

    /// Primary provider, the only one used for writes.
    pub fn provider(&self) -> &(dyn Provider + Send + Sync) {
        self.providers[0].as_ref()
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Blocks a transaction needs, including its own, before it counts.
    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            // Nothing listens on port 1.
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 2,
            ..BlockchainConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = BlockchainClient::new(test_config()).unwrap();
        assert_eq!(client.confirmation_blocks(), 1);
        assert!(format!("{:?}", client).contains("127.0.0.1:1"));
    }

    #[test]
    fn test_invalid_primary_url() {
        let mut config = test_config();
        config.rpc_url = "file:///tmp/node.ipc".to_string();
        assert!(matches!(
            BlockchainClient::new(config),
            Err(BlockchainError::Rpc(_))
        ));
    }

    #[tokio::test]
    async fn test_every_provider_unreachable() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        config.failover_urls.push("not a url".to_string());

        let client = BlockchainClient::new(config).unwrap();
        assert_eq!(client.providers.len(), 2);

        // The last provider's own error comes back, not a summary.
        match client.get_chain_id().await {
            Err(BlockchainError::Rpc(message)) => assert!(!message.contains("no provider")),
            other => panic!("expected RPC error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_for_block_unreachable_node() {
        let client = BlockchainClient::new(test_config()).unwrap();
        let result = client
            .wait_for_block(10, 20, Duration::from_millis(10))
            .await;
        assert!(matches!(result, Err(BlockchainError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_wait_for_block_past_deadline() {
        // Would be an RPC error if a request were sent.
        let client = BlockchainClient::new(test_config()).unwrap();
        let result = client
            .wait_for_block(400, 356, Duration::from_millis(10))
            .await;
        assert!(matches!(
            result,
            Err(BlockchainError::DeadlineExceeded { target: 400, deadline: 356 })
        ));
    }
}
