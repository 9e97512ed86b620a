//! Monetary constants shared by every cooperating node
//!
//! All nodes must agree on these values for reward transactions to be
//! accepted network-wide, so they are fixed at compile time.

/// Reserved sender identity for block rewards. Transactions from this sender
/// skip signature and balance checks.
pub const MINING_SENDER: &str = "THE BLOCKCHAIN";

/// Value of the reward transaction included in every mined block
pub const MINING_REWARD: f64 = 1.0;

/// Returns true when `value` is an amount a transaction may carry
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
