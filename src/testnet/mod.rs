//! Test fixtures shared across module tests
//!
//! Peer-client doubles that record what a ledger sends to its neighbors, and
//! helpers for building funded ledgers and signed requests.

pub mod test_utils;

pub use test_utils::*;
