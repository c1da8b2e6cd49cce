//! Creation bytecode from compiled contract artifacts.
//!
//! Accepts Foundry (`{"bytecode": {"object": "0x.."}}`), Hardhat
//! (`{"bytecode": "0x.."}`) or a bare hex file.

use alloy::primitives::{hex, Bytes};
use serde_json::Value;
use std::path::Path;

use crate::challenges::{ChallengeError, ChallengeResult};

/// Load creation bytecode from an artifact file.
pub fn load_bytecode(path: &Path) -> ChallengeResult<Bytes> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ChallengeError::Artifact(format!("{}: {}", path.display(), e)))?;
    parse_bytecode(&content)
        .map_err(|e| ChallengeError::Artifact(format!("{}: {}", path.display(), e)))
}

/// Extract creation bytecode from artifact text.
pub fn parse_bytecode(content: &str) -> Result<Bytes, String> {
    let content = content.trim();
    let code = if content.starts_with('{') {
        let json: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        match json.get("bytecode") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => obj
                .get("object")
                .and_then(Value::as_str)
                .ok_or("bytecode.object is missing")?
                .to_string(),
            _ => return Err("no bytecode in artifact".to_string()),
        }
    } else {
        content.to_string()
    };

    let raw = hex::decode(code.trim()).map_err(|e| format!("bytecode is not hex: {}", e))?;
    if raw.is_empty() {
        return Err("bytecode is empty (abstract contract or interface?)".to_string());
    }
    Ok(Bytes::from(raw))
}

/// Creation code followed by ABI-encoded constructor arguments.
pub fn with_constructor_args(code: &Bytes, args: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(code.len() + args.len());
    out.extend_from_slice(code);
    out.extend_from_slice(args);
    Bytes::from(out)
}
