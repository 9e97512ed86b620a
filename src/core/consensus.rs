//! Chain validation and the longest-valid-chain rule
//!
//! Length is the only weight: there is no accumulated-work comparison and ties
//! never replace the local chain.

use crate::core::{Block, ProofOfWork};
use log::{debug, info};

/// Every block after the first must link to the hash of its predecessor and
/// carry a nonce that satisfies the proof-of-work predicate. The first block
/// is taken as-is, so a genesis-only chain is trivially valid.
pub fn validate_chain(chain: &[Block], difficulty: usize) -> bool {
    for (index, pair) in chain.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);

        if block.get_previous_hash() != &previous.hash() {
            debug!("Block {} does not link to its predecessor", index + 1);
            return false;
        }

        if !ProofOfWork::validate(block, difficulty) {
            debug!("Block {} fails proof-of-work", index + 1);
            return false;
        }
    }
    true
}

/// Greedy scan over peer chains: a chain becomes the candidate only if it is
/// strictly longer than the best length seen so far (starting at
/// `local_length`) and validates. Returns the winning peer and chain, if any.
pub fn select_longest_chain<I>(
    local_length: usize,
    remote_chains: I,
    difficulty: usize,
) -> Option<(String, Vec<Block>)>
where
    I: IntoIterator<Item = (String, Vec<Block>)>,
{
    let mut max_length = local_length;
    let mut winner = None;

    for (peer, chain) in remote_chains {
        if chain.len() <= max_length {
            continue;
        }
        if validate_chain(&chain, difficulty) {
            info!("Chain from {peer} is the new candidate (length {})", chain.len());
            max_length = chain.len();
            winner = Some((peer, chain));
        } else {
            info!("Ignoring invalid chain from {peer} (length {})", chain.len());
        }
    }

    winner
}
