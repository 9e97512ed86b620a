use crate::core::{Block, BlockHash, Transaction};
use data_encoding::HEXLOWER;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};

/// Required count of leading '0' hex characters in a block hash. Must match on
/// every cooperating node; not adjusted at runtime.
pub const MINING_DIFFICULTY: usize = 3;

const MAX_NONCE: u64 = u64::MAX;

// How many nonces to try between checks of the cancel flag
const CANCEL_CHECK_INTERVAL: u64 = 1 << 12;

pub struct ProofOfWork {
    candidate: Block,
    difficulty: usize,
}

impl ProofOfWork {
    /// Search state over a snapshot of `transactions`; the candidate block is
    /// stamped with timestamp 0.
    pub fn new_proof_of_work(
        previous_hash: BlockHash,
        transactions: Vec<Transaction>,
        difficulty: usize,
    ) -> ProofOfWork {
        ProofOfWork {
            candidate: Block::with_timestamp(0, 0, previous_hash, transactions),
            difficulty,
        }
    }

    /// Does `nonce` make the timestamp-0 block over these fields satisfy `difficulty`?
    pub fn is_valid_proof(
        nonce: u64,
        previous_hash: &BlockHash,
        transactions: &[Transaction],
        difficulty: usize,
    ) -> bool {
        let guess = Block::with_timestamp(0, nonce, *previous_hash, transactions.to_vec());
        Self::meets_difficulty(&guess.hash(), difficulty)
    }

    /// Checks a block's recorded nonce against its own fields
    pub fn validate(block: &Block, difficulty: usize) -> bool {
        Self::is_valid_proof(
            block.get_nonce(),
            block.get_previous_hash(),
            block.get_transactions(),
            difficulty,
        )
    }

    /// Linear search from nonce 0. Returns `None` if `cancel` gets set or the
    /// nonce space runs out.
    pub fn run(&mut self, cancel: &AtomicBool) -> Option<u64> {
        info!("Mining the block (difficulty: {})", self.difficulty);
        let mut nonce: u64 = 0;
        loop {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                info!("Proof-of-work cancelled at nonce {nonce}");
                return None;
            }

            self.candidate.set_nonce(nonce);
            let hash = self.candidate.hash();
            if Self::meets_difficulty(&hash, self.difficulty) {
                debug!("Found nonce {nonce}: {}", HEXLOWER.encode(&hash));
                return Some(nonce);
            }

            if nonce == MAX_NONCE {
                return None;
            }
            nonce += 1;
        }
    }

    fn meets_difficulty(hash: &BlockHash, difficulty: usize) -> bool {
        let hex = HEXLOWER.encode(hash);
        difficulty <= hex.len() && hex.as_bytes()[..difficulty].iter().all(|&c| c == b'0')
    }
}
