//! Wallet management
//!
//! This module handles key generation, address derivation, transaction signing
//! and the on-disk keystore. Nodes never validate addresses; only wallets do.

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod wallets;

pub use wallet::{
    convert_address, derive_address, hash_pub_key, validate_address, Wallet, WalletSummary,
    ADDRESS_CHECK_SUM_LEN,
};
pub use wallets::Wallets;
