// This file implements the value-transfer record that blocks carry
// There are no inputs or outputs here: an account's balance is whatever the chain
// says it received minus whatever it sent, so a transaction only names both parties

use crate::core::MINING_SENDER;
use crate::error::Result;
use crate::utils::{canonical_json, sha256_digest, verify, PublicKey, Signature};
use serde::{Deserialize, Serialize};

// The plain record that lives in the pool and in blocks
// Field order and JSON names are the canonical encoding, so I never reorder them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "sender_blockchain_address")]
    sender: String,
    #[serde(rename = "recipient_blockchain_address")]
    recipient: String,
    value: f64,
}

impl Transaction {
    // Pure constructor; the ledger is the one that rejects negative values
    pub fn new(sender: &str, recipient: &str, value: f64) -> Transaction {
        Transaction {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            value,
        }
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_recipient(&self) -> &str {
        self.recipient.as_str()
    }

    pub fn get_value(&self) -> f64 {
        self.value
    }

    // Block rewards come from the reserved system identity and carry no signature
    pub fn is_reward(&self) -> bool {
        self.sender == MINING_SENDER
    }

    /// Canonical encoding:
    /// `{"sender_blockchain_address":..,"recipient_blockchain_address":..,"value":..}`
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_json(self)
    }

    pub fn digest(&self) -> [u8; 32] {
        sha256_digest(&self.canonical_bytes())
    }

    // The signer hashes the canonical bytes itself, so this checks the signature
    // against exactly `digest()`
    pub fn verify_signature(&self, public_key: &PublicKey, signature: &Signature) -> bool {
        verify(public_key, &self.canonical_bytes(), signature)
    }
}

// This is what wallets submit and what nodes relay to each other:
// the plain record plus the sender's public key and signature, both as hex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender_blockchain_address: String,
    pub recipient_blockchain_address: String,
    pub sender_public_key: String,
    pub value: f64,
    pub signature: String,
}

impl TransactionRequest {
    pub fn new(transaction: &Transaction, public_key: &PublicKey, signature: &Signature) -> Self {
        TransactionRequest {
            sender_blockchain_address: transaction.sender.clone(),
            recipient_blockchain_address: transaction.recipient.clone(),
            sender_public_key: public_key.to_hex(),
            value: transaction.value,
            signature: signature.to_hex(),
        }
    }

    pub fn transaction(&self) -> Transaction {
        Transaction::new(
            &self.sender_blockchain_address,
            &self.recipient_blockchain_address,
            self.value,
        )
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_hex(&self.sender_public_key)
    }

    pub fn signature(&self) -> Result<Signature> {
        Signature::from_hex(&self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generate_keypair;

    #[test]
    fn test_canonical_bytes_field_order() {
        let tx = Transaction::new("alice", "bob", 10.0);
        assert_eq!(
            String::from_utf8(tx.canonical_bytes()).unwrap(),
            r#"{"sender_blockchain_address":"alice","recipient_blockchain_address":"bob","value":10.0}"#
        );
    }

    #[test]
    fn test_digest_is_stable() {
        let a = Transaction::new("alice", "bob", 1.5);
        let b = Transaction::new("alice", "bob", 1.5);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), Transaction::new("alice", "bob", 2.5).digest());
    }

    #[test]
    fn test_signature_binds_value() {
        let key_pair = generate_keypair().unwrap();
        let tx = Transaction::new("alice", "bob", 10.0);
        let signature = key_pair.sign(&tx.canonical_bytes()).unwrap();

        assert!(tx.verify_signature(key_pair.public_key(), &signature));

        let tampered = Transaction::new("alice", "bob", 1000.0);
        assert!(!tampered.verify_signature(key_pair.public_key(), &signature));
    }

    #[test]
    fn test_request_round_trip_through_json() {
        let key_pair = generate_keypair().unwrap();
        let tx = Transaction::new("alice", "bob", 3.0);
        let signature = key_pair.sign(&tx.canonical_bytes()).unwrap();
        let request = TransactionRequest::new(&tx, key_pair.public_key(), &signature);

        let json = serde_json::to_string(&request).unwrap();
        let parsed: TransactionRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.transaction(), tx);
        assert!(parsed
            .transaction()
            .verify_signature(&parsed.public_key().unwrap(), &parsed.signature().unwrap()));
    }

    // Values that pick up rounding noise from ordinary arithmetic must come
    // back bit-for-bit, or the digest a peer recomputes differs from the signed one
    #[test]
    fn test_float_values_survive_json_exactly() {
        let mut values = vec![62107.126000000004, 0.1 + 0.2, 1.0 / 3.0, f64::MIN_POSITIVE];
        for cents in 0..20_000u32 {
            values.push(f64::from(cents) * 3.107 + 0.01);
        }

        for value in values {
            let tx = Transaction::new("alice", "bob", value);
            let parsed: Transaction = serde_json::from_str(&serde_json::to_string(&tx).unwrap()).unwrap();
            assert_eq!(parsed.get_value().to_bits(), value.to_bits(), "value {value}");
            assert_eq!(parsed.digest(), tx.digest());
        }
    }

    #[test]
    fn test_signature_verifies_after_json_hop() {
        let key_pair = generate_keypair().unwrap();
        let tx = Transaction::new("alice", "bob", 62107.126000000004);
        let signature = key_pair.sign(&tx.canonical_bytes()).unwrap();
        let request = TransactionRequest::new(&tx, key_pair.public_key(), &signature);

        let parsed: TransactionRequest =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert!(parsed
            .transaction()
            .verify_signature(&parsed.public_key().unwrap(), &parsed.signature().unwrap()));
    }

    #[test]
    fn test_request_missing_field_is_rejected() {
        let json = r#"{"sender_blockchain_address":"a","recipient_blockchain_address":"b","value":1.0}"#;
        assert!(serde_json::from_str::<TransactionRequest>(json).is_err());
    }

    #[test]
    fn test_reward_detection() {
        assert!(Transaction::new(MINING_SENDER, "miner", 1.0).is_reward());
        assert!(!Transaction::new("alice", "miner", 1.0).is_reward());
    }
}
