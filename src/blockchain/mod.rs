//! Chain access for the solver.
//!
//! # Data Flow
//! ```text
//! network profile (RPC URLs, chain id, key variable)
//!     → wallet.rs (player key, nonce)
//!     → client.rs (reads with per-request timeout and failover)
//!     → transaction.rs (TxIntent → signed envelope → confirmed TxOutcome)
//! ```
//!
//! Writes go through the primary RPC only; reads fall back to the failover
//! URLs in order.

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::TxBuilder;
pub use types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, TxAction, TxIntent,
    TxOutcome,
};
pub use wallet::Wallet;
