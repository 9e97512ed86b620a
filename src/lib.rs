//! # Peer Ledger - A Minimal Peer-Replicated Proof-of-Work Ledger
//!
//! A small cluster of nodes, each holding its own copy of a hash-linked chain of
//! blocks, kept in agreement by the longest-valid-chain rule. When I come back to
//! this code, here's what I need to remember:
//!
//! ## What It Does
//! - **Account Balances**: No UTXOs; a balance is a replay of every transfer in the chain
//! - **Signed Transfers**: ECDSA P-256 over the canonical JSON of each transaction
//! - **Proof-of-Work**: Fixed difficulty, leading zero hex characters in the block hash
//! - **Consensus**: Adopt a neighbor's chain only if it is strictly longer and valid
//! - **Wallets**: Bitcoin-style Base58Check addresses from P-256 public keys
//! - **In Memory**: Every node starts from a fresh genesis block; nothing is persisted
//!
//! ## How the Code Is Organized
//! - `core/`: Transactions, blocks, proof-of-work, validation and the `Ledger` itself
//! - `wallet/`: Key management, address derivation, transaction signing, keystore
//! - `network/`: JSON-over-TCP server and client, neighbor discovery, background loops
//! - `storage/`: The pending transaction pool
//! - `config/`: Node settings from the environment and flags
//! - `utils/`: Hashing, signatures, encodings
//! - `cli/`: Command-line interface for the node and the wallet client
//!
//! ## Where to Start Reading
//! 1. `core/ledger.rs` for admission, mining and conflict resolution
//! 2. `core/block.rs` and `core/transaction.rs` for the canonical encodings
//! 3. `network/sync.rs` for what a running node does on its own
//! 4. `main.rs` for the CLI commands

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    Block, BlockHash, Ledger, ProofOfWork, Transaction, TransactionRequest, MINING_DIFFICULTY,
    MINING_REWARD, MINING_SENDER,
};
pub use error::{LedgerError, Result};
pub use network::{NoopPeerClient, PeerClient, Server, TcpPeerClient};
pub use storage::MemoryPool;
pub use utils::{
    base58_decode, base58_encode, current_timestamp, generate_keypair, ripemd160_digest,
    sha256_digest, sign, verify, KeyPair, PublicKey, Signature,
};
pub use wallet::{
    convert_address, derive_address, hash_pub_key, validate_address, Wallet, Wallets,
    ADDRESS_CHECK_SUM_LEN,
};
