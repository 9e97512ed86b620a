//! Utility functions and helpers
//!
//! Cryptographic primitives (P-256 keys, ECDSA, SHA-256, RIPEMD-160, base58)
//! and the encoding helpers used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, current_timestamp, generate_keypair, ripemd160_digest,
    sha256_digest, sign, verify, KeyPair, PublicKey, SecretKey, Signature, PUBLIC_KEY_LEN,
    SIGNATURE_LEN,
};

pub use serialization::{canonical_json, deserialize, serialize};
