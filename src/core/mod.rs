//! Core ledger functionality
//!
//! This module contains the fundamental components: transactions, blocks,
//! proof-of-work, chain validation and the ledger that ties them together.

pub mod block;
pub mod consensus;
pub mod ledger;
pub mod monetary;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, BlockHash};
pub use consensus::{select_longest_chain, validate_chain};
pub use ledger::{balance_of, Ledger};
pub use monetary::{is_valid_amount, MINING_REWARD, MINING_SENDER};
pub use proof_of_work::{ProofOfWork, MINING_DIFFICULTY};
pub use transaction::{Transaction, TransactionRequest};
