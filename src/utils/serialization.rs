// Encoding helpers: bincode for the local wallet keystore, JSON for everything
// that crosses the wire or gets hashed
use crate::error::{LedgerError, Result};
use serde::Serialize;

/// Serialize data using bincode 2.0 with standard configuration
pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| LedgerError::Serialization(format!("Serialization failed: {e}")))
}

/// Deserialize data using bincode 2.0 with standard configuration
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: bincode::Decode<()>,
{
    let config = bincode::config::standard();
    let (data, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| LedgerError::Serialization(format!("Deserialization failed: {e}")))?;
    Ok(data)
}

/// Compact JSON in struct declaration order. Used for the canonical encoding
/// of transactions and blocks, so field order and names are part of the
/// cross-node contract.
pub fn canonical_json<T: Serialize>(data: &T) -> Vec<u8> {
    // Only plain structs of strings and numbers go through here, which
    // serde_json cannot fail to encode.
    serde_json::to_vec(data).expect("canonical JSON encoding of plain records cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Serialize, bincode::Encode, bincode::Decode)]
    struct Record {
        zeta: u64,
        alpha: String,
    }

    #[test]
    fn test_bincode_keystore_map() {
        let mut map = HashMap::new();
        map.insert("addr".to_string(), vec![1u8, 2, 3]);

        let bytes = serialize(&map).expect("Serialization should work");
        let decoded: HashMap<String, Vec<u8>> =
            deserialize(&bytes).expect("Deserialization should work");
        assert_eq!(map, decoded);
    }

    #[test]
    fn test_deserialize_invalid_data() {
        let invalid_bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<HashMap<String, Vec<u8>>> = deserialize(&invalid_bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_canonical_json_keeps_declaration_order() {
        let record = Record {
            zeta: 7,
            alpha: "a".to_string(),
        };
        assert_eq!(canonical_json(&record), br#"{"zeta":7,"alpha":"a"}"#.to_vec());
    }
}
