//! Block header reconstruction.
//!
//! # Data Flow
//! ```text
//! JSON-RPC block / consensus header
//!     → HeaderFields (field name → raw value, absent fields omitted)
//!     → field.rs (canonical minimal byte strings)
//!     → reconstruct.rs (search over optional-field inclusion patterns)
//!     → encode.rs (RLP list + keccak256, compared to the block hash)
//! ```
//!
//! Chains append fork-specific fields to the header at different points, and
//! a client may omit fields it does not know about. The reconstructor does
//! not trust any single schema: it tries every inclusion pattern of the
//! optional fields it was given until the encoding hashes to the known
//! block hash.

pub mod encode;
pub mod field;
pub mod reconstruct;

use std::collections::BTreeMap;

use alloy::primitives::{hex, Bytes, B256, U256};
use serde_json::Value;
use thiserror::Error;

pub use field::{FieldKind, FieldValue, HeaderField};
pub use reconstruct::{reconstruct, Reconstruction};

/// Errors produced while reconstructing a header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// A mandatory field was not supplied.
    #[error("missing mandatory header field {0}")]
    MissingField(HeaderField),

    /// The logs bloom is not exactly 256 bytes.
    #[error("logs bloom must be 256 bytes, got {0}")]
    MalformedBloom(usize),

    /// A raw value could not be parsed.
    #[error("invalid value for header field {field}: {reason}")]
    InvalidValue { field: HeaderField, reason: String },

    /// The block object carries no usable `hash`.
    #[error("invalid block hash: {0}")]
    BlockHash(String),

    /// No inclusion pattern reproduced the target hash.
    #[error("no header encoding matches the target hash after {attempts} candidates")]
    NotFound { attempts: usize },
}

/// Result type for header operations.
pub type HeaderResult<T> = Result<T, HeaderError>;

/// Raw header field values keyed by field, kept in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    values: BTreeMap<HeaderField, FieldValue>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: HeaderField, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn remove(&mut self, field: HeaderField) -> Option<FieldValue> {
        self.values.remove(&field)
    }

    pub fn get(&self, field: HeaderField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Present optional fields, in canonical order.
    pub fn optional_present(&self) -> Vec<HeaderField> {
        HeaderField::OPTIONAL
            .into_iter()
            .filter(|f| self.values.contains_key(f))
            .collect()
    }

    /// Parse a JSON-RPC block object (`eth_getBlockByNumber` result).
    ///
    /// Keys that are missing or `null` are left out; mandatory ones are
    /// reported later by [`reconstruct`].
    pub fn from_json(block: &Value) -> HeaderResult<Self> {
        let mut fields = Self::new();
        for field in HeaderField::MANDATORY.into_iter().chain(HeaderField::OPTIONAL) {
            let raw = match block.get(field.json_key()) {
                None | Some(Value::Null) => continue,
                Some(raw) => raw,
            };
            fields.values.insert(field, parse_json_value(field, raw)?);
        }
        Ok(fields)
    }
}

impl From<&alloy::consensus::Header> for HeaderFields {
    fn from(header: &alloy::consensus::Header) -> Self {
        let mut fields = Self::new();
        fields
            .insert(HeaderField::ParentHash, hash_value(header.parent_hash.as_slice()))
            .insert(HeaderField::UnclesHash, hash_value(header.ommers_hash.as_slice()))
            .insert(HeaderField::Miner, hash_value(header.beneficiary.as_slice()))
            .insert(HeaderField::StateRoot, hash_value(header.state_root.as_slice()))
            .insert(HeaderField::TransactionsRoot, hash_value(header.transactions_root.as_slice()))
            .insert(HeaderField::ReceiptsRoot, hash_value(header.receipts_root.as_slice()))
            .insert(HeaderField::LogsBloom, hash_value(header.logs_bloom.as_slice()))
            .insert(HeaderField::Difficulty, header.difficulty)
            .insert(HeaderField::Number, header.number)
            .insert(HeaderField::GasLimit, header.gas_limit)
            .insert(HeaderField::GasUsed, header.gas_used)
            .insert(HeaderField::Timestamp, header.timestamp)
            .insert(HeaderField::ExtraData, FieldValue::Bytes(header.extra_data.clone()))
            .insert(HeaderField::MixHash, hash_value(header.mix_hash.as_slice()))
            .insert(
                HeaderField::Nonce,
                FieldValue::Fixed {
                    bytes: Bytes::copy_from_slice(header.nonce.as_slice()),
                    width: field::NONCE_WIDTH,
                },
            );

        if let Some(base_fee) = header.base_fee_per_gas {
            fields.insert(HeaderField::BaseFeePerGas, base_fee);
        }
        if let Some(root) = header.withdrawals_root {
            fields.insert(HeaderField::WithdrawalsRoot, hash_value(root.as_slice()));
        }
        if let Some(blob_gas_used) = header.blob_gas_used {
            fields.insert(HeaderField::BlobGasUsed, blob_gas_used);
        }
        if let Some(excess_blob_gas) = header.excess_blob_gas {
            fields.insert(HeaderField::ExcessBlobGas, excess_blob_gas);
        }
        if let Some(root) = header.parent_beacon_block_root {
            fields.insert(HeaderField::ParentBeaconBlockRoot, hash_value(root.as_slice()));
        }
        if let Some(hash) = header.requests_hash {
            fields.insert(HeaderField::RequestsHash, hash_value(hash.as_slice()));
        }
        fields
    }
}

/// The `hash` of a JSON-RPC block object: the target a reconstruction of
/// its header has to reproduce.
pub fn block_hash(block: &Value) -> HeaderResult<B256> {
    let raw = block
        .get("hash")
        .and_then(Value::as_str)
        .ok_or_else(|| HeaderError::BlockHash("missing".to_string()))?;
    raw.parse()
        .map_err(|e| HeaderError::BlockHash(format!("'{}': {}", raw, e)))
}

fn hash_value(bytes: &[u8]) -> FieldValue {
    FieldValue::Bytes(Bytes::copy_from_slice(bytes))
}

fn parse_json_value(field: HeaderField, raw: &Value) -> HeaderResult<FieldValue> {
    let invalid = |reason: String| HeaderError::InvalidValue { field, reason };

    match (field.kind(), raw) {
        (FieldKind::Quantity, Value::Number(n)) => n
            .as_u64()
            .map(FieldValue::from)
            .ok_or_else(|| invalid(format!("not an unsigned integer: {}", n))),
        (FieldKind::Quantity, Value::String(s)) => {
            let parsed = match s.strip_prefix("0x") {
                Some(digits) if digits.is_empty() => Ok(U256::ZERO),
                Some(digits) => U256::from_str_radix(digits, 16),
                None => U256::from_str_radix(s, 10),
            };
            parsed
                .map(FieldValue::Uint)
                .map_err(|e| invalid(format!("bad quantity '{}': {}", s, e)))
        }
        (FieldKind::Hash, Value::String(s)) => hex::decode(s)
            .map(|b| FieldValue::Bytes(Bytes::from(b)))
            .map_err(|e| invalid(format!("bad hex '{}': {}", s, e))),
        (FieldKind::Fixed(width), Value::String(s)) => hex::decode(s)
            .map(|b| FieldValue::Fixed { bytes: Bytes::from(b), width })
            .map_err(|e| invalid(format!("bad hex '{}': {}", s, e))),
        (FieldKind::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (_, other) => Err(invalid(format!("unexpected JSON value {}", other))),
    }
}
