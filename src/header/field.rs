//! Header field descriptors and canonical byte encoding of field values.

use alloy::primitives::{hex, Bytes, U256};
use std::fmt;

/// Width of the proof-of-work nonce.
pub const NONCE_WIDTH: usize = 8;

/// Width of the logs bloom filter.
pub const LOGS_BLOOM_WIDTH: usize = 256;

/// Every header field in canonical encoding order.
///
/// The first fifteen are present in every header. The rest were appended by
/// later protocol upgrades and only appear on blocks past that upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderField {
    ParentHash,
    UnclesHash,
    Miner,
    StateRoot,
    TransactionsRoot,
    ReceiptsRoot,
    LogsBloom,
    Difficulty,
    Number,
    GasLimit,
    GasUsed,
    Timestamp,
    ExtraData,
    MixHash,
    Nonce,
    BaseFeePerGas,
    WithdrawalsRoot,
    BlobGasUsed,
    ExcessBlobGas,
    ParentBeaconBlockRoot,
    RequestsHash,
}

impl HeaderField {
    pub const MANDATORY: [HeaderField; 15] = [
        HeaderField::ParentHash,
        HeaderField::UnclesHash,
        HeaderField::Miner,
        HeaderField::StateRoot,
        HeaderField::TransactionsRoot,
        HeaderField::ReceiptsRoot,
        HeaderField::LogsBloom,
        HeaderField::Difficulty,
        HeaderField::Number,
        HeaderField::GasLimit,
        HeaderField::GasUsed,
        HeaderField::Timestamp,
        HeaderField::ExtraData,
        HeaderField::MixHash,
        HeaderField::Nonce,
    ];

    /// Fork extensions, in the order they are appended to the encoding.
    pub const OPTIONAL: [HeaderField; 6] = [
        HeaderField::BaseFeePerGas,
        HeaderField::WithdrawalsRoot,
        HeaderField::BlobGasUsed,
        HeaderField::ExcessBlobGas,
        HeaderField::ParentBeaconBlockRoot,
        HeaderField::RequestsHash,
    ];

    /// Key used for this field in a JSON-RPC block object.
    pub fn json_key(self) -> &'static str {
        match self {
            HeaderField::ParentHash => "parentHash",
            HeaderField::UnclesHash => "sha3Uncles",
            HeaderField::Miner => "miner",
            HeaderField::StateRoot => "stateRoot",
            HeaderField::TransactionsRoot => "transactionsRoot",
            HeaderField::ReceiptsRoot => "receiptsRoot",
            HeaderField::LogsBloom => "logsBloom",
            HeaderField::Difficulty => "difficulty",
            HeaderField::Number => "number",
            HeaderField::GasLimit => "gasLimit",
            HeaderField::GasUsed => "gasUsed",
            HeaderField::Timestamp => "timestamp",
            HeaderField::ExtraData => "extraData",
            HeaderField::MixHash => "mixHash",
            HeaderField::Nonce => "nonce",
            HeaderField::BaseFeePerGas => "baseFeePerGas",
            HeaderField::WithdrawalsRoot => "withdrawalsRoot",
            HeaderField::BlobGasUsed => "blobGasUsed",
            HeaderField::ExcessBlobGas => "excessBlobGas",
            HeaderField::ParentBeaconBlockRoot => "parentBeaconBlockRoot",
            HeaderField::RequestsHash => "requestsHash",
        }
    }

    pub fn is_mandatory(self) -> bool {
        self <= HeaderField::Nonce
    }

    /// How a raw JSON value for this field should be interpreted.
    pub fn kind(self) -> FieldKind {
        match self {
            HeaderField::Difficulty
            | HeaderField::Number
            | HeaderField::GasLimit
            | HeaderField::GasUsed
            | HeaderField::Timestamp
            | HeaderField::BaseFeePerGas
            | HeaderField::BlobGasUsed
            | HeaderField::ExcessBlobGas => FieldKind::Quantity,
            HeaderField::Nonce => FieldKind::Fixed(NONCE_WIDTH),
            HeaderField::ExtraData => FieldKind::Text,
            _ => FieldKind::Hash,
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_key())
    }
}

/// Interpretation of a field's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Quantity,
    Hash,
    Fixed(usize),
    Text,
}

/// A raw header field value before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Scalar; encoded big-endian without leading zeros.
    Uint(U256),
    /// Hash, address, root or bloom; encoded as-is.
    Bytes(Bytes),
    /// Left-padded or truncated to `width` bytes.
    Fixed { bytes: Bytes, width: usize },
    /// Raw bytes when given as a `0x` hex literal, UTF-8 otherwise.
    Text(String),
}

impl FieldValue {
    /// Canonical minimal byte string for this value.
    pub fn canonical(&self) -> Bytes {
        match self {
            FieldValue::Uint(value) => {
                let be = value.to_be_bytes::<32>();
                let start = be.iter().position(|b| *b != 0).unwrap_or(be.len());
                Bytes::copy_from_slice(&be[start..])
            }
            FieldValue::Bytes(bytes) => bytes.clone(),
            FieldValue::Fixed { bytes, width } => fit_width(bytes, *width),
            FieldValue::Text(text) => match decode_hex_literal(text) {
                Some(raw) => Bytes::from(raw),
                None => Bytes::copy_from_slice(text.as_bytes()),
            },
        }
    }

    /// Length of the raw value, before canonicalization.
    pub fn raw_len(&self) -> usize {
        match self {
            FieldValue::Uint(value) => value.byte_len(),
            FieldValue::Bytes(bytes) => bytes.len(),
            FieldValue::Fixed { bytes, .. } => bytes.len(),
            FieldValue::Text(text) => decode_hex_literal(text)
                .map(|raw| raw.len())
                .unwrap_or(text.len()),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Uint(U256::from(value))
    }
}

impl From<U256> for FieldValue {
    fn from(value: U256) -> Self {
        FieldValue::Uint(value)
    }
}

/// Keeps the low-order `width` bytes, left-padding with zeros when short.
fn fit_width(bytes: &[u8], width: usize) -> Bytes {
    let mut out = vec![0u8; width];
    if bytes.len() >= width {
        out.copy_from_slice(&bytes[bytes.len() - width..]);
    } else {
        out[width - bytes.len()..].copy_from_slice(bytes);
    }
    Bytes::from(out)
}

fn decode_hex_literal(text: &str) -> Option<Vec<u8>> {
    let digits = text.strip_prefix("0x")?;
    hex::decode(digits).ok()
}
