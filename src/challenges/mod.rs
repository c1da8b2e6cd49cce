//! Challenge exploits.
//!
//! # Data Flow
//! ```text
//! ChallengeConfig (target address + exploit parameters)
//!     → exploit module (reads chain state, may deploy helpers)
//!     → TxIntent (the final state-changing step)
//!     → runner submits it and re-checks isSolved
//! ```
//!
//! Every challenge contract exposes `isSolved(address)`, which the runner
//! queries before and after acting.

pub mod artifact;
pub mod block_header;
pub mod code_size;
pub mod create2;
pub mod reentrancy;
pub mod signature;
pub mod storage;

use alloy::primitives::Address;
use alloy::sol;
use alloy::sol_types::SolCall;
use thiserror::Error;

use crate::blockchain::transaction::view_request;
use crate::blockchain::{BlockchainError, TxBuilder, TxIntent, TxOutcome};
use crate::config::ExploitConfig;
use crate::header::HeaderError;

sol! {
    /// Completion status shared by every challenge.
    interface IChallenge {
        function isSolved(address player) external view returns (bool);
    }

    interface IVault {
        function unlock(bytes32 password) external;
    }

    interface IAttacker {
        function attack() external payable;
    }

    interface ISignatureGate {
        function usedSignature() external view returns (bytes32 digest, uint8 v, bytes32 r, bytes32 s);
        function claim(bytes32 digest, uint8 v, bytes32 r, bytes32 s) external;
    }

    interface IFactory {
        function deploy(bytes32 salt) external returns (address);
    }

    interface IHeaderGate {
        function solve(bytes header) external;
    }
}

/// Errors raised while preparing an exploit.
#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error("header reconstruction failed: {0}")]
    Header(#[from] HeaderError),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("invalid challenge address '{0}'")]
    Address(String),

    #[error("no CREATE2 salt below {max_salts} gives an address starting with {prefix}")]
    SaltNotFound { prefix: String, max_salts: u64 },

    #[error("no header encoding found in the last {blocks} blocks")]
    HeaderNotFound { blocks: u64 },

    #[error("exploit precondition failed: {0}")]
    Precondition(String),
}

/// Result type for challenge operations.
pub type ChallengeResult<T> = Result<T, ChallengeError>;

/// What an exploit can use while preparing its intent.
pub struct ChallengeContext<'a> {
    pub tx: &'a TxBuilder,
    pub target: Address,
    pub confirmation_timeout_secs: u64,
}

impl ChallengeContext<'_> {
    /// Run a view function and decode its return value.
    pub async fn view<C: SolCall>(&self, to: Address, call: C) -> ChallengeResult<C::Return> {
        let data = self
            .tx
            .client()
            .call(&view_request(to, call.abi_encode()))
            .await?;
        C::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Abi(e.to_string()).into())
    }

    /// Submit a preparatory transaction and wait for it.
    pub async fn submit(&self, intent: &TxIntent) -> ChallengeResult<TxOutcome> {
        Ok(self.tx.submit(intent, self.confirmation_timeout_secs).await?)
    }

    pub fn player(&self) -> Address {
        self.tx.address()
    }
}

/// Query the challenge's completion status for `player`.
pub async fn is_solved(ctx: &ChallengeContext<'_>, player: Address) -> ChallengeResult<bool> {
    ctx.view(ctx.target, IChallenge::isSolvedCall { player }).await
}

/// Prepare the final transaction for a challenge.
pub async fn exploit(config: &ExploitConfig, ctx: &ChallengeContext<'_>) -> ChallengeResult<TxIntent> {
    match config {
        ExploitConfig::Storage { slot } => storage::exploit(ctx, *slot).await,
        ExploitConfig::Reentrancy { artifact, deposit_wei } => {
            reentrancy::exploit(ctx, artifact, *deposit_wei).await
        }
        ExploitConfig::CodeSize { artifact } => code_size::exploit(ctx, artifact),
        ExploitConfig::Signature => signature::exploit(ctx).await,
        ExploitConfig::Create2 {
            artifact,
            prefix,
            max_salts,
        } => create2::exploit(ctx, artifact, prefix, *max_salts),
        ExploitConfig::BlockHeader { block_attempts } => {
            block_header::exploit(ctx, *block_attempts).await
        }
    }
}
