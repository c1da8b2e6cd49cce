//! CREATE2 address grinding.
//!
//! `address = keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code))[12..]`
//! depends only on inputs we control, so a salt can be searched offline
//! before anything is sent.

use alloy::primitives::{hex, keccak256, Address, B256, U256};
use alloy::sol_types::SolCall;
use std::path::Path;

use crate::blockchain::TxIntent;
use crate::challenges::artifact::load_bytecode;
use crate::challenges::{ChallengeContext, ChallengeError, ChallengeResult, IFactory};

/// A salt whose CREATE2 address matches the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaltMatch {
    pub salt: B256,
    pub address: Address,
    pub attempts: u64,
}

pub fn exploit(
    ctx: &ChallengeContext<'_>,
    artifact: &Path,
    prefix: &str,
    max_salts: u64,
) -> ChallengeResult<TxIntent> {
    let init_code = load_bytecode(artifact)?;
    let init_code_hash = keccak256(&init_code);

    let found = grind(ctx.target, init_code_hash, prefix, max_salts).ok_or_else(|| {
        ChallengeError::SaltNotFound {
            prefix: prefix.to_string(),
            max_salts,
        }
    })?;

    tracing::info!(
        salt = %found.salt,
        address = %found.address,
        attempts = found.attempts,
        "Found CREATE2 salt"
    );
    Ok(TxIntent::call(
        ctx.target,
        IFactory::deployCall { salt: found.salt }.abi_encode(),
    ))
}

/// Try salts `0..max_salts` (as big-endian words) until the address's
/// lowercase hex starts with `prefix`.
pub fn grind(deployer: Address, init_code_hash: B256, prefix: &str, max_salts: u64) -> Option<SaltMatch> {
    let prefix = prefix.strip_prefix("0x").unwrap_or(prefix).to_ascii_lowercase();

    (0..max_salts).find_map(|i| {
        let salt = B256::from(U256::from(i).to_be_bytes::<32>());
        let address = deployer.create2(salt.0, init_code_hash.0);
        hex::encode(address.as_slice())
            .starts_with(&prefix)
            .then_some(SaltMatch {
                salt,
                address,
                attempts: i + 1,
            })
    })
}
