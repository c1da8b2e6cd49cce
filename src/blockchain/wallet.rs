//! Player account.
//!
//! The key comes from the environment variable named by the active network
//! profile and is never written to logs or config files.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Signing key plus a locally tracked nonce.
///
/// Clones share the nonce counter, so transactions built from any clone
/// get consecutive nonces.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    next_nonce: Arc<AtomicU64>,
    chain_id: u64,
}

impl Wallet {
    /// Parse a hex private key, with or without `0x` and surrounding
    /// whitespace (keys pasted into `.env` files often carry a newline).
    pub fn from_private_key(key: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer = key
            .parse::<PrivateKeySigner>()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key: {}", e)))?
            .with_chain_id(Some(chain_id));

        tracing::info!(player = %signer.address(), chain_id, "Loaded player key");

        Ok(Self {
            signer,
            next_nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        })
    }

    pub fn from_env(var: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key = std::env::var(var).map_err(|_| {
            BlockchainError::Wallet(format!("Environment variable {} not set", var))
        })?;
        Self::from_private_key(&key, chain_id)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Signer wrapper used to sign transaction envelopes.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }

    /// Reserve the next nonce.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.next_nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Resynchronize with the pending nonce reported by the chain.
    pub fn set_nonce(&self, nonce: u64) {
        self.next_nonce.store(nonce, Ordering::SeqCst);
    }

    pub fn current_nonce(&self) -> u64 {
        self.next_nonce.load(Ordering::SeqCst)
    }
}
