use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, LikError};

/// Encodes a serializable payload as canonical JSON bytes.
///
/// Values are routed through [`serde_json::Value`] so map keys come out
/// sorted; two payloads with equal content therefore encode identically
/// regardless of field declaration order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, LikError> {
    let value = serde_json::to_value(value)
        .map_err(|err| LikError::Serde(ErrorInfo::new("json-encode", err.to_string())))?;
    serde_json::to_vec(&value)
        .map_err(|err| LikError::Serde(ErrorInfo::new("json-encode", err.to_string())))
}

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, LikError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn hash_is_stable_across_calls() {
        let payload = (vec![2.0_f64, 1.0], vec![1_u64, 2, 3]);
        let a = stable_hash_string(&payload).expect("hash");
        let b = stable_hash_string(&payload).expect("hash");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn canonical_bytes_sort_map_keys() {
        let mut first = BTreeMap::new();
        first.insert("b", 2);
        first.insert("a", 1);
        let mut second = BTreeMap::new();
        second.insert("a", 1);
        second.insert("b", 2);
        assert_eq!(
            to_canonical_json_bytes(&first).expect("bytes"),
            to_canonical_json_bytes(&second).expect("bytes"),
        );
    }
}
