use crate::core::Transaction;
use crate::error::Result;
use crate::utils::{canonical_json, current_timestamp, sha256_digest};
use serde::{Deserialize, Serialize};

/// SHA-256 digest of a block's canonical encoding
pub type BlockHash = [u8; 32];

/// A batch of transactions linked to its predecessor.
///
/// The block's own hash is never stored: every verifier recomputes it from the
/// content, which is what exposes tampering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    timestamp: i64,
    nonce: u64,
    #[serde(with = "hex_hash")]
    previous_hash: BlockHash,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Stamps the current wall-clock time (nanoseconds) and takes its own copy
    /// of `transactions`.
    pub fn new_block(
        nonce: u64,
        previous_hash: BlockHash,
        transactions: &[Transaction],
    ) -> Result<Block> {
        Ok(Block {
            timestamp: current_timestamp()?,
            nonce,
            previous_hash,
            transactions: transactions.to_vec(),
        })
    }

    /// Block with an explicit timestamp. Proof-of-work candidates use 0 here so
    /// the validity check does not depend on when it runs.
    pub fn with_timestamp(
        timestamp: i64,
        nonce: u64,
        previous_hash: BlockHash,
        transactions: Vec<Transaction>,
    ) -> Block {
        Block {
            timestamp,
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// First block of every chain: no transactions, nonce 0, linked to the hash
    /// of the all-zero default block.
    pub fn generate_genesis_block() -> Result<Block> {
        let zero_block = Block::with_timestamp(0, 0, [0u8; 32], vec![]);
        Block::new_block(0, zero_block.hash(), &[])
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    pub fn get_previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    pub fn get_previous_hash_hex(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.previous_hash)
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    /// `{"timestamp":..,"nonce":..,"previous_hash":"<hex>","transactions":[..]}`
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_json(self)
    }

    pub fn hash(&self) -> BlockHash {
        sha256_digest(&self.canonical_bytes())
    }

    pub fn hash_hex(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.hash())
    }
}

/// `previous_hash` travels as 64 lowercase hex characters
mod hex_hash {
    use super::BlockHash;
    use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &BlockHash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&HEXLOWER.encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BlockHash, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = HEXLOWER_PERMISSIVE
            .decode(encoded.as_bytes())
            .map_err(|e| D::Error::custom(format!("invalid previous_hash hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(D::Error::custom(format!(
                "previous_hash must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(hash)
    }
}
