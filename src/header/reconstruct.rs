//! Search for the header encoding that reproduces a known block hash.

use alloy::primitives::{Bytes, B256};

use crate::header::encode::hash_fields;
use crate::header::field::{HeaderField, LOGS_BLOOM_WIDTH};
use crate::header::{HeaderError, HeaderFields, HeaderResult};

/// A header encoding whose keccak256 equals the target hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// RLP list encoding of the header.
    pub encoding: Bytes,
    /// Optional fields that were appended, in canonical order.
    pub included: Vec<HeaderField>,
    /// Number of candidate encodings hashed, including the match.
    pub attempts: usize,
}

/// Find the inclusion pattern of optional fields whose encoding hashes to
/// `target`.
///
/// Absent optional fields are never tried. The bloom filter and mandatory
/// fields are checked before anything is hashed.
pub fn reconstruct(target: B256, fields: &HeaderFields) -> HeaderResult<Reconstruction> {
    let mut mandatory = Vec::with_capacity(HeaderField::MANDATORY.len());
    for field in HeaderField::MANDATORY {
        let value = fields.get(field).ok_or(HeaderError::MissingField(field))?;
        if field == HeaderField::LogsBloom && value.raw_len() != LOGS_BLOOM_WIDTH {
            return Err(HeaderError::MalformedBloom(value.raw_len()));
        }
        mandatory.push(value.canonical());
    }

    let optional: Vec<(HeaderField, Bytes)> = fields
        .optional_present()
        .into_iter()
        .filter_map(|f| fields.get(f).map(|v| (f, v.canonical())))
        .collect();

    let base_fee_bit = optional
        .iter()
        .position(|(f, _)| *f == HeaderField::BaseFeePerGas)
        .map(|i| 1u32 << i);

    let mut attempts = 0;
    let mut candidate: Vec<&Bytes> = Vec::with_capacity(mandatory.len() + optional.len());
    for mask in candidate_order(optional.len(), base_fee_bit) {
        attempts += 1;

        candidate.clear();
        candidate.extend(mandatory.iter());
        candidate.extend(
            optional
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, (_, value))| value),
        );

        let (encoded, hash) = hash_fields(&candidate);
        if hash == target {
            let included = optional
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, (field, _))| *field)
                .collect::<Vec<_>>();

            tracing::debug!(
                attempts,
                mask,
                included = ?included,
                "Header encoding matched"
            );

            return Ok(Reconstruction {
                encoding: Bytes::from(encoded),
                included,
                attempts,
            });
        }
    }

    tracing::debug!(attempts, optional = optional.len(), "No header encoding matched");
    Err(HeaderError::NotFound { attempts })
}

/// Inclusion masks over `k` optional fields, most likely first.
///
/// "Base fee only" and "everything" lead; the remaining masks follow in
/// increasing order. Each mask appears exactly once.
fn candidate_order(k: usize, base_fee_bit: Option<u32>) -> Vec<u32> {
    let total = 1u32 << k;
    let all = total - 1;

    let mut order = Vec::with_capacity(total as usize);
    if let Some(bit) = base_fee_bit {
        order.push(bit);
    }
    if !order.contains(&all) {
        order.push(all);
    }
    for mask in 0..total {
        if !order.contains(&mask) {
            order.push(mask);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::encode::encode_fields;
    use crate::header::FieldValue;
    use alloy::primitives::keccak256;

    fn mandatory_fields() -> HeaderFields {
        let mut fields = HeaderFields::new();
        fields
            .insert(HeaderField::ParentHash, FieldValue::Bytes(Bytes::from(vec![0x11; 32])))
            .insert(HeaderField::UnclesHash, FieldValue::Bytes(Bytes::from(vec![0x22; 32])))
            .insert(HeaderField::Miner, FieldValue::Bytes(Bytes::from(vec![0x33; 20])))
            .insert(HeaderField::StateRoot, FieldValue::Bytes(Bytes::from(vec![0x44; 32])))
            .insert(HeaderField::TransactionsRoot, FieldValue::Bytes(Bytes::from(vec![0x55; 32])))
            .insert(HeaderField::ReceiptsRoot, FieldValue::Bytes(Bytes::from(vec![0x66; 32])))
            .insert(HeaderField::LogsBloom, FieldValue::Bytes(Bytes::from(vec![0u8; 256])))
            .insert(HeaderField::Difficulty, 0u64)
            .insert(HeaderField::Number, 19_000_000u64)
            .insert(HeaderField::GasLimit, 30_000_000u64)
            .insert(HeaderField::GasUsed, 12_345_678u64)
            .insert(HeaderField::Timestamp, 1_700_000_000u64)
            .insert(HeaderField::ExtraData, FieldValue::Text("0x6265617665726275696c64".into()))
            .insert(HeaderField::MixHash, FieldValue::Bytes(Bytes::from(vec![0x77; 32])))
            .insert(
                HeaderField::Nonce,
                FieldValue::Fixed { bytes: Bytes::new(), width: 8 },
            );
        fields
    }

    fn with_all_optional() -> HeaderFields {
        let mut fields = mandatory_fields();
        fields
            .insert(HeaderField::BaseFeePerGas, 25_000_000_000u64)
            .insert(HeaderField::WithdrawalsRoot, FieldValue::Bytes(Bytes::from(vec![0x88; 32])))
            .insert(HeaderField::BlobGasUsed, 131_072u64)
            .insert(HeaderField::ExcessBlobGas, 0u64)
            .insert(
                HeaderField::ParentBeaconBlockRoot,
                FieldValue::Bytes(Bytes::from(vec![0x99; 32])),
            )
            .insert(HeaderField::RequestsHash, FieldValue::Bytes(Bytes::from(vec![0xaa; 32])));
        fields
    }

    /// Hash of the encoding that includes exactly the optional fields in `mask`.
    fn target_for(fields: &HeaderFields, mask: u32) -> B256 {
        let mut values: Vec<Bytes> = HeaderField::MANDATORY
            .iter()
            .map(|f| fields.get(*f).unwrap().canonical())
            .collect();
        for (i, field) in fields.optional_present().into_iter().enumerate() {
            if mask & (1 << i) != 0 {
                values.push(fields.get(field).unwrap().canonical());
            }
        }
        let refs: Vec<&Bytes> = values.iter().collect();
        keccak256(encode_fields(&refs))
    }

    #[test]
    fn test_candidate_order_is_a_permutation() {
        for k in 0..=6 {
            let mut order = candidate_order(k, (k > 0).then_some(1));
            assert_eq!(order.len(), 1 << k);
            order.sort_unstable();
            order.dedup();
            assert_eq!(order.len(), 1 << k);
        }
    }

    #[test]
    fn test_candidate_order_fast_path() {
        let order = candidate_order(6, Some(1));
        assert_eq!(&order[..3], &[1, 63, 0]);

        let order = candidate_order(3, None);
        assert_eq!(order, vec![7, 0, 1, 2, 3, 4, 5, 6]);

        assert_eq!(candidate_order(0, None), vec![0]);
    }

    #[test]
    fn test_every_pattern_round_trips() {
        let fields = with_all_optional();
        let optional = fields.optional_present();
        assert_eq!(optional.len(), 6);

        for mask in 0u32..64 {
            let result = reconstruct(target_for(&fields, mask), &fields).unwrap();
            let expected: Vec<HeaderField> = optional
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, f)| *f)
                .collect();
            assert_eq!(result.included, expected, "mask {mask:#b}");
            assert_eq!(keccak256(&result.encoding), target_for(&fields, mask));
        }
    }

    #[test]
    fn test_fabricated_target_is_not_found() {
        let fields = with_all_optional();
        let err = reconstruct(B256::repeat_byte(0xab), &fields).unwrap_err();
        assert_eq!(err, HeaderError::NotFound { attempts: 64 });
    }

    #[test]
    fn test_base_fee_only_is_first_attempt() {
        let fields = with_all_optional();
        let result = reconstruct(target_for(&fields, 0b1), &fields).unwrap();
        assert_eq!(result.included, vec![HeaderField::BaseFeePerGas]);
        assert_eq!(result.attempts, 1);

        let result = reconstruct(target_for(&fields, 0b111111), &fields).unwrap();
        assert_eq!(result.attempts, 2);
    }

    #[test]
    fn test_pre_fork_header_takes_one_attempt() {
        let fields = mandatory_fields();
        let result = reconstruct(target_for(&fields, 0), &fields).unwrap();
        assert!(result.included.is_empty());
        assert_eq!(result.attempts, 1);

        let err = reconstruct(B256::ZERO, &fields).unwrap_err();
        assert_eq!(err, HeaderError::NotFound { attempts: 1 });
    }

    #[test]
    fn test_absent_optional_field_is_never_included() {
        let mut fields = with_all_optional();
        fields.remove(HeaderField::WithdrawalsRoot);
        assert_eq!(fields.optional_present().len(), 5);

        let err = reconstruct(B256::ZERO, &fields).unwrap_err();
        assert_eq!(err, HeaderError::NotFound { attempts: 32 });
    }

    #[test]
    fn test_bloom_width_is_checked_before_hashing() {
        let mut fields = mandatory_fields();
        let target = target_for(&fields, 0);

        fields.insert(HeaderField::LogsBloom, FieldValue::Bytes(Bytes::from(vec![0u8; 255])));
        assert_eq!(reconstruct(target, &fields), Err(HeaderError::MalformedBloom(255)));

        fields.insert(HeaderField::LogsBloom, FieldValue::Bytes(Bytes::from(vec![0u8; 257])));
        assert_eq!(reconstruct(target, &fields), Err(HeaderError::MalformedBloom(257)));

        fields.insert(HeaderField::LogsBloom, FieldValue::Bytes(Bytes::from(vec![0u8; 256])));
        assert!(reconstruct(target, &fields).is_ok());
    }

    #[test]
    fn test_missing_mandatory_field() {
        let mut fields = mandatory_fields();
        fields.remove(HeaderField::MixHash);
        assert_eq!(
            reconstruct(B256::ZERO, &fields),
            Err(HeaderError::MissingField(HeaderField::MixHash))
        );
    }
}
