use crate::core::{Transaction, TransactionRequest};
use crate::error::Result;
use crate::utils::{base58_decode, base58_encode, ripemd160_digest, sha256_digest, KeyPair, PublicKey};
use serde::{Deserialize, Serialize};

const VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

// version + 20-byte key hash + checksum
const ADDRESS_PAYLOAD_LEN: usize = 1 + 20 + ADDRESS_CHECK_SUM_LEN;

/// A key pair and the address derived from it. The address never changes
/// for a given key.
#[derive(Clone, Debug)]
pub struct Wallet {
    key_pair: KeyPair,
    address: String,
}

/// What a wallet shows to its owner. Carries the private key, so it stays on
/// the wallet side and never travels to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub private_key: String,
    pub public_key: String,
    pub blockchain_address: String,
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        Ok(Self::from_key_pair(KeyPair::generate()?))
    }

    pub fn from_key_pair(key_pair: KeyPair) -> Wallet {
        let address = derive_address(key_pair.public_key());
        Wallet { key_pair, address }
    }

    pub fn from_pkcs8(pkcs8: &[u8]) -> Result<Wallet> {
        Ok(Self::from_key_pair(KeyPair::from_pkcs8(pkcs8)?))
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_public_key(&self) -> &PublicKey {
        self.key_pair.public_key()
    }

    pub fn get_key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Signs a transfer from this wallet and packages it for submission
    pub fn sign_transaction(&self, recipient: &str, value: f64) -> Result<TransactionRequest> {
        let transaction = Transaction::new(&self.address, recipient, value);
        let signature = self.key_pair.sign(&transaction.canonical_bytes())?;
        Ok(TransactionRequest::new(
            &transaction,
            self.key_pair.public_key(),
            &signature,
        ))
    }

    pub fn to_json_summary(&self) -> WalletSummary {
        WalletSummary {
            private_key: self.key_pair.secret().to_hex(),
            public_key: self.key_pair.public_key().to_hex(),
            blockchain_address: self.address.clone(),
        }
    }
}

/// RIPEMD-160 of SHA-256 over the affine coordinates, X then Y
pub fn hash_pub_key(public_key: &PublicKey) -> [u8; 20] {
    let mut coordinates = Vec::with_capacity(64);
    coordinates.extend_from_slice(public_key.x());
    coordinates.extend_from_slice(public_key.y());
    let pub_key_sha256 = sha256_digest(&coordinates);
    ripemd160_digest(&pub_key_sha256)
}

fn checksum(payload: &[u8]) -> [u8; ADDRESS_CHECK_SUM_LEN] {
    let first_sha = sha256_digest(payload);
    let second_sha = sha256_digest(&first_sha);
    let mut checksum = [0u8; ADDRESS_CHECK_SUM_LEN];
    checksum.copy_from_slice(&second_sha[..ADDRESS_CHECK_SUM_LEN]);
    checksum
}

pub fn derive_address(public_key: &PublicKey) -> String {
    convert_address(&hash_pub_key(public_key))
}

pub fn convert_address(pub_hash_key: &[u8]) -> String {
    let mut payload: Vec<u8> = vec![];
    payload.push(VERSION);
    payload.extend(pub_hash_key);
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    base58_encode(payload.as_slice())
}

/// Base58 that decodes to 25 bytes with the right version and checksum.
/// The ledger itself never calls this; nodes treat addresses as opaque.
pub fn validate_address(address: &str) -> bool {
    let payload = match base58_decode(address) {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    if payload.len() != ADDRESS_PAYLOAD_LEN || payload[0] != VERSION {
        return false;
    }

    let (body, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    checksum(body) == actual_checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_deterministic() {
        let wallet = Wallet::new().unwrap();
        let reloaded = Wallet::from_pkcs8(wallet.get_key_pair().secret().as_bytes()).unwrap();

        assert_eq!(wallet.get_address(), reloaded.get_address());
        assert_eq!(derive_address(wallet.get_public_key()), wallet.get_address());
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        let a = Wallet::new().unwrap();
        let b = Wallet::new().unwrap();
        assert_ne!(a.get_address(), b.get_address());
    }

    #[test]
    fn test_address_payload_layout() {
        let wallet = Wallet::new().unwrap();
        let payload = base58_decode(wallet.get_address()).unwrap();

        assert_eq!(payload.len(), 25);
        assert_eq!(payload[0], VERSION);
        assert_eq!(&payload[1..21], &hash_pub_key(wallet.get_public_key()));
        // A leading zero byte shows up as a leading '1'
        assert!(wallet.get_address().starts_with('1'));
    }

    #[test]
    fn test_key_hash_covers_both_coordinates() {
        let wallet = Wallet::new().unwrap();
        let public_key = wallet.get_public_key();
        let expected = ripemd160_digest(&sha256_digest(&[public_key.x(), public_key.y()].concat()));
        assert_eq!(hash_pub_key(public_key), expected);
    }

    #[test]
    fn test_validate_address() {
        let wallet = Wallet::new().unwrap();
        assert!(validate_address(wallet.get_address()));

        let mut payload = base58_decode(wallet.get_address()).unwrap();
        payload[24] ^= 0xff;
        assert!(!validate_address(&base58_encode(&payload)));

        assert!(!validate_address("0OIl"));
        assert!(!validate_address(""));
    }

    #[test]
    fn test_signed_transaction_verifies() {
        let wallet = Wallet::new().unwrap();
        let request = wallet.sign_transaction("recipient", 2.5).unwrap();

        assert_eq!(request.sender_blockchain_address, wallet.get_address());
        assert_eq!(request.sender_public_key.len(), 128);
        assert_eq!(request.signature.len(), 128);
        assert!(request
            .transaction()
            .verify_signature(&request.public_key().unwrap(), &request.signature().unwrap()));
    }

    #[test]
    fn test_json_summary_fields() {
        let wallet = Wallet::new().unwrap();
        let json = serde_json::to_value(wallet.to_json_summary()).unwrap();

        assert_eq!(json["blockchain_address"], wallet.get_address());
        assert_eq!(json["public_key"], wallet.get_public_key().to_hex());
        assert!(json["private_key"].is_string());
    }
}
