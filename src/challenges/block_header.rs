//! Prove knowledge of a recent block header.
//!
//! The target recomputes `keccak256(header)` and compares it with
//! `blockhash(number)`, which the EVM only serves for the 256 blocks before
//! the executing one. The header has to be rebuilt exactly as the node
//! hashed it, including whichever fork fields this chain appends.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;

use crate::blockchain::TxIntent;
use crate::challenges::{ChallengeContext, ChallengeError, ChallengeResult, IHeaderGate};
use crate::header::{block_hash, reconstruct, HeaderError, HeaderFields};

/// Number of past blocks whose hash `BLOCKHASH` returns.
pub const BLOCKHASH_WINDOW: u64 = 256;

pub async fn exploit(ctx: &ChallengeContext<'_>, block_attempts: u64) -> ChallengeResult<TxIntent> {
    let client = ctx.tx.client();
    let head = client.get_block_number().await?;

    // blockhash(head) is zero until head is no longer the latest block.
    client
        .wait_for_block(head + 1, head + BLOCKHASH_WINDOW, ctx.tx.poll_interval())
        .await?;

    for number in (0..=head).rev().take(block_attempts as usize) {
        let block = client.get_block(number).await?;
        let hash = block_hash(&block)?;
        let fields = HeaderFields::from_json(&block)?;
        let found = match reconstruct(hash, &fields) {
            Ok(found) => found,
            Err(HeaderError::NotFound { attempts }) => {
                tracing::warn!(block = number, attempts, "No header encoding matched, trying an earlier block");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        // The solve transaction runs in a later block than the current head.
        let executing = client.get_block_number().await? + 1;
        if !blockhash_available(number, executing) {
            return Err(ChallengeError::Precondition(format!(
                "block {} left the blockhash window at block {}",
                number, executing
            )));
        }

        tracing::info!(
            block = number,
            hash = %hash,
            included = ?found.included,
            attempts = found.attempts,
            "Header reconstructed"
        );
        return Ok(solve_intent(ctx.target, found.encoding));
    }

    Err(ChallengeError::HeaderNotFound {
        blocks: block_attempts,
    })
}

/// Whether `blockhash(number)` is non-zero in a transaction executing in
/// block `executing`.
pub fn blockhash_available(number: u64, executing: u64) -> bool {
    number < executing && executing - number <= BLOCKHASH_WINDOW
}

fn solve_intent(target: Address, header: Bytes) -> TxIntent {
    TxIntent::call(target, IHeaderGate::solveCall { header }.abi_encode())
}
