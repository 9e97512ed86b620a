//! Test utilities for ledger testing

use crate::core::{Block, Ledger, TransactionRequest, MINING_SENDER};
use crate::error::{LedgerError, Result};
use crate::network::PeerClient;
use crate::wallet::Wallet;
use std::collections::HashMap;
use std::sync::Mutex;

/// Records every outbound call as `"<kind> <peer>"` and serves chains from a
/// fixed map. Peers with no chain in the map are unreachable for fetches.
#[derive(Default)]
pub struct RecordingPeerClient {
    calls: Mutex<Vec<String>>,
    chains: Mutex<HashMap<String, Vec<Block>>>,
    failing: bool,
}

impl RecordingPeerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification fails after being recorded
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn serve_chain(&self, peer: &str, chain: Vec<Block>) {
        self.chains.lock().unwrap().insert(peer.to_string(), chain);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, peer: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("{kind} {peer}"));
        if self.failing {
            return Err(LedgerError::Network(format!("{peer} is unreachable")));
        }
        Ok(())
    }
}

impl PeerClient for RecordingPeerClient {
    fn notify_pool_clear(&self, peer: &str) -> Result<()> {
        self.record("clear", peer)
    }

    fn broadcast_transaction(&self, peer: &str, _transaction: &TransactionRequest) -> Result<()> {
        self.record("broadcast", peer)
    }

    fn notify_consensus_check(&self, peer: &str) -> Result<()> {
        self.record("consensus", peer)
    }

    fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>> {
        self.chains
            .lock()
            .unwrap()
            .get(peer)
            .cloned()
            .ok_or_else(|| LedgerError::Network(format!("{peer} is unreachable")))
    }
}

/// Credits `value` to `address` on the chain by admitting a reward-sender
/// transaction and mining it. The mining reward also lands in the block.
pub fn fund_address(ledger: &Ledger, address: &str, value: f64) {
    assert!(ledger.add_transaction(MINING_SENDER, address, value, None, None));
    assert!(ledger.mine());
}

pub fn signed_request(wallet: &Wallet, recipient: &str, value: f64) -> TransactionRequest {
    wallet.sign_transaction(recipient, value).unwrap()
}
