// This is the ledger engine - it owns the chain and the pending pool for one node
// Everything lives in memory for the life of the process; there is no database
// The chain and the pool share one mutex, the neighbor set has its own

use crate::core::consensus::{select_longest_chain, validate_chain};
use crate::core::monetary::is_valid_amount;
use crate::core::{
    Block, BlockHash, ProofOfWork, Transaction, TransactionRequest, MINING_DIFFICULTY,
    MINING_REWARD, MINING_SENDER,
};
use crate::error::Result;
use crate::network::{Nodes, PeerClient};
use crate::storage::MemoryPool;
use crate::utils::{PublicKey, Signature};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

// Mining has to snapshot the pool, clear it and append to the chain as one step,
// so both live under the same lock
struct LedgerState {
    chain: Vec<Block>,
    pool: MemoryPool,
}

impl LedgerState {
    // The chain always has at least the genesis block
    fn last_block(&self) -> &Block {
        &self.chain[self.chain.len() - 1]
    }
}

pub struct Ledger {
    state: Mutex<LedgerState>,
    // Copy of the chain as of the last append or replacement. Readers take it
    // without waiting on the state lock, which mining holds for a whole search.
    committed: RwLock<Arc<Vec<Block>>>,
    neighbors: Nodes,
    blockchain_address: String, // Where this node's mining rewards go
    port: u16,
    peer_client: Arc<dyn PeerClient>,
    shutdown: AtomicBool,
}

impl Ledger {
    // I create the ledger once per process, starting from a fresh genesis block
    pub fn new(
        blockchain_address: &str,
        port: u16,
        peer_client: Arc<dyn PeerClient>,
    ) -> Result<Ledger> {
        let genesis = Block::generate_genesis_block()?;
        info!("Created genesis block {}", genesis.hash_hex());

        Ok(Ledger {
            committed: RwLock::new(Arc::new(vec![genesis.clone()])),
            state: Mutex::new(LedgerState {
                chain: vec![genesis],
                pool: MemoryPool::new(),
            }),
            neighbors: Nodes::new(),
            blockchain_address: blockchain_address.to_string(),
            port,
            peer_client,
            shutdown: AtomicBool::new(false),
        })
    }

    // A panic mid-update can't leave the state half-written, so a poisoned lock is still usable
    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_blockchain_address(&self) -> &str {
        self.blockchain_address.as_str()
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    // Only called with the state lock held, so snapshots follow chain order
    fn publish(&self, chain: &[Block]) {
        *self.committed.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(chain.to_vec());
    }

    /// The committed chain. Never blocks on an in-progress mining round.
    pub fn chain_snapshot(&self) -> Arc<Vec<Block>> {
        Arc::clone(&self.committed.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get_chain(&self) -> Vec<Block> {
        self.chain_snapshot().to_vec()
    }

    pub fn chain_len(&self) -> usize {
        self.lock_state().chain.len()
    }

    pub fn last_block(&self) -> Block {
        self.lock_state().last_block().clone()
    }

    pub fn get_transaction_pool(&self) -> Vec<Transaction> {
        self.lock_state().pool.get_all().to_vec()
    }

    pub fn pool_len(&self) -> usize {
        self.lock_state().pool.len()
    }

    pub fn clear_transaction_pool(&self) {
        self.lock_state().pool.clear();
        info!("Transaction pool cleared");
    }

    // -- neighbors --

    pub fn set_neighbors(&self, addrs: Vec<String>) {
        self.neighbors.replace_all(addrs);
        info!("Neighbors: {:?}", self.neighbors.get_addrs());
    }

    pub fn get_neighbors(&self) -> Vec<String> {
        self.neighbors.get_addrs()
    }

    // -- shutdown --

    /// Stops background loops at their next tick and cancels any running
    /// proof-of-work search
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    // -- blocks --

    /// Moves the whole pending pool into a new block on top of the chain, then
    /// tells every neighbor to clear its pool
    pub fn create_block(&self, nonce: u64, previous_hash: BlockHash) -> Result<Block> {
        let block = {
            let mut state = self.lock_state();
            self.append_block(&mut state, nonce, previous_hash)?
        };
        self.notify_pool_clear();
        Ok(block)
    }

    fn append_block(
        &self,
        state: &mut LedgerState,
        nonce: u64,
        previous_hash: BlockHash,
    ) -> Result<Block> {
        let block = Block::new_block(nonce, previous_hash, state.pool.get_all())?;
        state.chain.push(block.clone());
        state.pool.clear();
        self.publish(&state.chain);
        Ok(block)
    }

    // -- transactions --

    /// Admits a transaction into the pool.
    ///
    /// Rewards from `MINING_SENDER` are admitted unconditionally. Anything else
    /// needs a finite non-negative value, a signature over the canonical encoding that verifies against
    /// `sender_public_key`, and a chain balance of at least `value`.
    pub fn add_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: f64,
        sender_public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> bool {
        let transaction = Transaction::new(sender, recipient, value);

        if transaction.is_reward() {
            self.lock_state().pool.add(transaction);
            return true;
        }

        if !is_valid_amount(value) {
            warn!("Rejected transaction from {sender}: invalid value {value}");
            return false;
        }

        let (Some(public_key), Some(signature)) = (sender_public_key, signature) else {
            warn!("Rejected transaction from {sender}: missing public key or signature");
            return false;
        };

        if !transaction.verify_signature(public_key, signature) {
            error!("Rejected transaction from {sender}: signature verification failed");
            return false;
        }

        // The balance is read from the committed snapshot, outside the state lock,
        // and the append below is a separate critical section. Two concurrent
        // submissions can each see the same balance, so they can jointly overspend it.
        let balance = self.calculate_balance(sender);
        if balance < value {
            error!("Rejected transaction from {sender}: balance {balance} is below {value}");
            return false;
        }

        self.lock_state().pool.add(transaction);
        true
    }

    /// `add_transaction`, then relays the signed transaction to every neighbor
    /// on success. Only this entry point fans out.
    pub fn create_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: f64,
        sender_public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> bool {
        if !self.add_transaction(sender, recipient, value, sender_public_key, signature) {
            return false;
        }

        if let (Some(public_key), Some(signature)) = (sender_public_key, signature) {
            let request =
                TransactionRequest::new(&Transaction::new(sender, recipient, value), public_key, signature);
            for peer in self.neighbors.get_addrs() {
                if let Err(e) = self.peer_client.broadcast_transaction(&peer, &request) {
                    warn!("Failed to broadcast transaction to {peer}: {e}");
                }
            }
        }
        true
    }

    /// Wire entry point for wallet submissions; broadcasts on success
    pub fn submit_transaction(&self, request: &TransactionRequest) -> bool {
        self.admit_request(request, true)
    }

    /// Wire entry point for transactions relayed by peers; never re-broadcasts
    pub fn relay_transaction(&self, request: &TransactionRequest) -> bool {
        self.admit_request(request, false)
    }

    fn admit_request(&self, request: &TransactionRequest, broadcast: bool) -> bool {
        let public_key = match request.public_key() {
            Ok(key) => key,
            Err(e) => {
                warn!("Rejected transaction from {}: {e}", request.sender_blockchain_address);
                return false;
            }
        };
        let signature = match request.signature() {
            Ok(sig) => sig,
            Err(e) => {
                warn!("Rejected transaction from {}: {e}", request.sender_blockchain_address);
                return false;
            }
        };

        let sender = request.sender_blockchain_address.as_str();
        let recipient = request.recipient_blockchain_address.as_str();
        if broadcast {
            self.create_transaction(sender, recipient, request.value, Some(&public_key), Some(&signature))
        } else {
            self.add_transaction(sender, recipient, request.value, Some(&public_key), Some(&signature))
        }
    }

    /// Replays the whole chain: credits where `address` received, debits where it sent.
    /// Pending transactions do not count. Reads the committed snapshot, so it
    /// does not wait for a mining round to finish.
    pub fn calculate_balance(&self, address: &str) -> f64 {
        balance_of(&self.chain_snapshot(), address)
    }

    // -- mining --

    /// Searches for a nonce over a snapshot of the current pool on top of the
    /// last block. Holds the ledger lock for the whole search.
    pub fn proof_of_work(&self) -> Option<u64> {
        let state = self.lock_state();
        self.search_nonce(&state)
    }

    fn search_nonce(&self, state: &LedgerState) -> Option<u64> {
        let previous_hash = state.last_block().hash();
        let mut pow = ProofOfWork::new_proof_of_work(previous_hash, state.pool.snapshot(), MINING_DIFFICULTY);
        pow.run(&self.shutdown)
    }

    /// Pays the reward to this node, mines the pool into a new block, then tells
    /// neighbors to clear their pools and re-run consensus.
    ///
    /// Mines even when the pool holds nothing but the reward. Returns false
    /// only if the search was cancelled by shutdown or the block could not be built.
    pub fn mine(&self) -> bool {
        let block = {
            let mut state = self.lock_state();
            state.pool.add(Transaction::new(
                MINING_SENDER,
                &self.blockchain_address,
                MINING_REWARD,
            ));

            let Some(nonce) = self.search_nonce(&state) else {
                state.pool.pop();
                warn!("action=mining, status=cancelled");
                return false;
            };

            let previous_hash = state.last_block().hash();
            match self.append_block(&mut state, nonce, previous_hash) {
                Ok(block) => block,
                Err(e) => {
                    state.pool.pop();
                    error!("action=mining, status=failed: {e}");
                    return false;
                }
            }
        };

        info!(
            "action=mining, status=success, nonce={}, hash={}",
            block.get_nonce(),
            block.hash_hex()
        );

        // Peers call back into this node for our chain, so the lock is released first
        self.notify_pool_clear();
        self.notify_consensus_check();
        true
    }

    // -- consensus --

    pub fn validate_chain(&self, chain: &[Block]) -> bool {
        validate_chain(chain, MINING_DIFFICULTY)
    }

    /// Longest-valid-chain rule over the given peer chains. Replaces the local
    /// chain wholesale when a strictly longer valid chain exists.
    pub fn resolve_conflicts_with<I>(&self, remote_chains: I) -> bool
    where
        I: IntoIterator<Item = (String, Vec<Block>)>,
    {
        let local_length = self.chain_len();
        let Some((peer, chain)) = select_longest_chain(local_length, remote_chains, MINING_DIFFICULTY)
        else {
            info!("Resolve conflicts: chain not replaced");
            return false;
        };

        let mut state = self.lock_state();
        // Mining may have grown the local chain while we were validating
        if chain.len() <= state.chain.len() {
            info!("Resolve conflicts: chain not replaced");
            return false;
        }
        info!(
            "Resolve conflicts: chain replaced by {peer} ({} -> {} blocks)",
            state.chain.len(),
            chain.len()
        );
        state.chain = chain;
        self.publish(&state.chain);
        true
    }

    /// Fetches every neighbor's chain and applies the longest-valid-chain rule.
    /// Unreachable peers are skipped for this round.
    pub fn resolve_conflicts(&self) -> bool {
        let mut remote_chains = Vec::new();
        for peer in self.neighbors.get_addrs() {
            match self.peer_client.fetch_chain(&peer) {
                Ok(chain) => remote_chains.push((peer, chain)),
                Err(e) => warn!("Skipping {peer} during consensus: {e}"),
            }
        }
        self.resolve_conflicts_with(remote_chains)
    }

    // -- fan-out --

    fn notify_pool_clear(&self) {
        for peer in self.neighbors.get_addrs() {
            if let Err(e) = self.peer_client.notify_pool_clear(&peer) {
                warn!("Failed to clear transaction pool on {peer}: {e}");
            }
        }
    }

    fn notify_consensus_check(&self) {
        for peer in self.neighbors.get_addrs() {
            if let Err(e) = self.peer_client.notify_consensus_check(&peer) {
                warn!("Failed to trigger consensus on {peer}: {e}");
            }
        }
    }
}

/// Net value received by `address` across every transaction in `chain`
pub fn balance_of(chain: &[Block], address: &str) -> f64 {
    let mut total = 0.0;
    for block in chain {
        for tx in block.get_transactions() {
            if tx.get_recipient() == address {
                total += tx.get_value();
            }
            if tx.get_sender() == address {
                total -= tx.get_value();
            }
        }
    }
    total
}
