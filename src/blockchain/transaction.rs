//! From [`TxIntent`] to a confirmed transaction.
//!
//! Intents are filled in (nonce, gas price, gas limit), signed locally with
//! the player key and broadcast as raw envelopes, then watched until they
//! are buried under the profile's confirmation depth.
//!
//! A failed estimate (the call would revert) stops the transaction before
//! it is signed.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, TxAction, TxIntent, TxOutcome,
};
use crate::blockchain::wallet::Wallet;

/// Sends intents from the player's account.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
    poll_interval: Duration,
}

impl TxBuilder {
    pub fn new(client: BlockchainClient, wallet: Wallet, poll_interval: Duration) -> Self {
        Self {
            client,
            wallet,
            poll_interval,
        }
    }

    /// Request carrying only the intent and the sender.
    pub fn request(&self, intent: &TxIntent) -> TransactionRequest {
        intent_request(self.wallet.address(), intent)
    }

    /// Fill in nonce, gas price and gas limit.
    ///
    /// The gas price is checked against the profile cap before the
    /// multiplier is applied.
    pub async fn build(&self, intent: &TxIntent) -> BlockchainResult<TransactionRequest> {
        let config = self.client.config();

        // Another tool may have used the key since the last send.
        let chain_nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        self.wallet.set_nonce(chain_nonce);

        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }
        let adjusted_gas_price = (gas_price as f64 * config.gas_price_multiplier) as u128;

        let request = self.request(intent);
        let estimate = self.client.estimate_gas(&request).await?;
        let gas_limit = (estimate as f64 * config.gas_limit_multiplier) as u64;

        let nonce = self.wallet.get_and_increment_nonce();

        Ok(request
            .with_nonce(nonce)
            .with_gas_price(adjusted_gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(gas_limit))
    }

    /// Sign a built request and broadcast it.
    pub async fn send(&self, request: TransactionRequest) -> BlockchainResult<TxHash> {
        let envelope = request
            .build(&self.wallet.network_wallet())
            .await
            .map_err(|e| BlockchainError::Build(e.to_string()))?;
        let raw = envelope.encoded_2718();

        let tx_hash = self.client.send_raw_transaction(&raw).await?;
        tracing::info!(tx_hash = %tx_hash, "Transaction sent");
        Ok(tx_hash)
    }

    /// Build, sign, send and wait for the intent to be confirmed.
    pub async fn submit(&self, intent: &TxIntent, timeout_secs: u64) -> BlockchainResult<TxOutcome> {
        let request = self.build(intent).await?;
        let tx_hash = self.send(request).await?;

        match self.wait_for_confirmation(tx_hash, timeout_secs).await? {
            ConfirmationStatus::Confirmed(outcome) => Ok(outcome),
            ConfirmationStatus::Reverted(tx_hash) => {
                Err(BlockchainError::Reverted(format!("transaction {} reverted", tx_hash)))
            }
        }
    }

    /// Poll for the receipt until the transaction reverts or reaches the
    /// confirmation depth, giving up after `timeout_secs`.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout_secs: u64,
    ) -> BlockchainResult<ConfirmationStatus> {
        let required_confirmations = self.client.confirmation_blocks();
        let timeout_duration = Duration::from_secs(timeout_secs);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(self.poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Reverted(tx_hash));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                // The inclusion block counts as the first confirmation.
                let confirmations = (current_block.saturating_sub(tx_block) + 1) as u32;

                if confirmations >= required_confirmations {
                    return Ok(ConfirmationStatus::Confirmed(TxOutcome {
                        tx_hash,
                        block_number: tx_block,
                        contract_address: receipt.contract_address,
                    }));
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(timeout_secs)),
        }
    }

    /// Player address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Transaction request for `intent`, sent from `from`.
pub fn intent_request(from: Address, intent: &TxIntent) -> TransactionRequest {
    let request = TransactionRequest::default()
        .with_from(from)
        .with_value(intent.value);
    match intent.action {
        TxAction::Call(to) => request.with_to(to).with_input(intent.input.clone()),
        TxAction::Deploy => request.with_deploy_code(intent.input.clone()),
    }
}

/// Read-only call request with no sender.
pub fn view_request(to: Address, input: impl Into<Bytes>) -> TransactionRequest {
    TransactionRequest::default().with_to(to).with_input(input.into())
}
