//! Shared chain types: errors, transaction intents and outcomes.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Chain id as reported by `eth_chainId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

#[derive(Debug, Error)]
pub enum BlockchainError {
    /// The node answered with an error, or could not be reached.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    #[error("Transaction not confirmed after {0} seconds")]
    ConfirmationTimeout(u64),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// The RPC URL points at a different network than the profile says.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("Block {0} not found")]
    BlockNotFound(u64),

    #[error("Block {target} not reached before deadline block {deadline}")]
    DeadlineExceeded { target: u64, deadline: u64 },

    /// Return data did not decode as the expected ABI type.
    #[error("ABI decode error: {0}")]
    Abi(String),

    #[error("Transaction build error: {0}")]
    Build(String),
}

pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Destination of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    Call(Address),
    /// Contract creation; the input is the init code.
    Deploy,
}

/// One state-changing step produced by an exploit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIntent {
    pub action: TxAction,
    pub input: Bytes,
    pub value: U256,
}

impl TxIntent {
    pub fn call(to: Address, input: impl Into<Bytes>) -> Self {
        Self {
            action: TxAction::Call(to),
            input: input.into(),
            value: U256::ZERO,
        }
    }

    pub fn deploy(code: impl Into<Bytes>) -> Self {
        Self {
            action: TxAction::Deploy,
            input: code.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// A mined transaction that did not revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Set for deployments.
    pub contract_address: Option<Address>,
}

/// Final state of a watched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Mined successfully and buried under enough blocks.
    Confirmed(TxOutcome),
    /// Mined with a failing status.
    Reverted(TxHash),
}
