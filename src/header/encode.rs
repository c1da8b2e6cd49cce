//! RLP list encoding of canonical field byte strings.

use alloy::primitives::{keccak256, Bytes, B256};
use alloy::rlp::{Encodable, Header};

/// Encodes `fields` as an RLP list of byte strings.
pub fn encode_fields(fields: &[&Bytes]) -> Vec<u8> {
    let payload_length: usize = fields
        .iter()
        .map(|f| <[u8] as Encodable>::length(f))
        .sum();
    let list_header = Header { list: true, payload_length };

    let mut out = Vec::with_capacity(payload_length + list_header.length());
    list_header.encode(&mut out);
    for field in fields {
        <[u8] as Encodable>::encode(field, &mut out);
    }
    out
}

/// keccak256 of the RLP list encoding of `fields`.
pub fn hash_fields(fields: &[&Bytes]) -> (Vec<u8>, B256) {
    let encoded = encode_fields(fields);
    let hash = keccak256(&encoded);
    (encoded, hash)
}
