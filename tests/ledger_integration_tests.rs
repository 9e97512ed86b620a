//! Ledger integration tests
//!
//! End-to-end scenarios through the public API: funded transfers, forged
//! signatures, and conflict resolution between nodes.

use peer_ledger::core::{validate_chain, Block, Ledger, MINING_DIFFICULTY, MINING_SENDER};
use peer_ledger::network::{NoopPeerClient, PeerClient, Server, TcpPeerClient};
use peer_ledger::wallet::Wallet;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

fn new_ledger(miner: &str) -> Ledger {
    Ledger::new(miner, 5000, Arc::new(NoopPeerClient)).unwrap()
}

fn ledger_with_length(length: usize) -> Ledger {
    let ledger = new_ledger("some-miner");
    while ledger.chain_len() < length {
        assert!(ledger.mine());
    }
    ledger
}

#[test]
fn test_funded_transfer_end_to_end() {
    let ledger = new_ledger("the-miner");
    let alice = Wallet::new().unwrap();
    let bob = Wallet::new().unwrap();

    // Give A a prior mined balance of 20
    assert!(ledger.add_transaction(MINING_SENDER, alice.get_address(), 20.0, None, None));
    assert!(ledger.mine());
    assert_eq!(ledger.calculate_balance(alice.get_address()), 20.0);
    let length_before = ledger.chain_len();

    let request = alice.sign_transaction(bob.get_address(), 10.0).unwrap();
    assert!(ledger.add_transaction(
        &request.sender_blockchain_address,
        &request.recipient_blockchain_address,
        request.value,
        Some(&request.public_key().unwrap()),
        Some(&request.signature().unwrap()),
    ));
    assert_eq!(ledger.pool_len(), 1);

    assert!(ledger.mine());
    assert_eq!(ledger.chain_len(), length_before + 1);
    assert_eq!(ledger.pool_len(), 0);
    assert_eq!(ledger.calculate_balance(bob.get_address()), 10.0);
    assert_eq!(ledger.calculate_balance(alice.get_address()), 10.0);
    assert!(validate_chain(&ledger.get_chain(), MINING_DIFFICULTY));
}

#[test]
fn test_forged_signature_is_rejected() {
    let ledger = new_ledger("the-miner");
    let alice = Wallet::new().unwrap();
    let mallory = Wallet::new().unwrap();

    // Mallory signs, but the request claims Alice's key
    let mut request = mallory.sign_transaction("bob", 0.0).unwrap();
    request.sender_blockchain_address = alice.get_address().to_string();
    request.sender_public_key = alice.get_public_key().to_hex();
    let pool_before = ledger.pool_len();

    assert!(!ledger.add_transaction(
        &request.sender_blockchain_address,
        &request.recipient_blockchain_address,
        request.value,
        Some(&request.public_key().unwrap()),
        Some(&request.signature().unwrap()),
    ));
    assert_eq!(ledger.pool_len(), pool_before);
}

#[test]
fn test_longer_valid_chain_replaces_local() {
    let local = ledger_with_length(3);
    let remote = ledger_with_length(5);

    assert!(local.resolve_conflicts_with(vec![("peer".to_string(), remote.get_chain())]));
    assert_eq!(local.chain_len(), 5);
    assert_eq!(local.get_chain(), remote.get_chain());
}

#[test]
fn test_tampered_chain_is_ignored() {
    let local = ledger_with_length(3);
    let remote = ledger_with_length(5);
    let local_chain = local.get_chain();

    let mut json = serde_json::to_value(remote.get_chain()).unwrap();
    json[2]["previous_hash"] = serde_json::Value::String("00".repeat(32));
    let tampered: Vec<Block> = serde_json::from_value(json).unwrap();
    assert!(!validate_chain(&tampered, MINING_DIFFICULTY));

    assert!(!local.resolve_conflicts_with(vec![("peer".to_string(), tampered)]));
    assert_eq!(local.get_chain(), local_chain);
}

#[test]
fn test_equal_length_chain_does_not_replace() {
    let local = ledger_with_length(3);
    let remote = ledger_with_length(3);
    let local_chain = local.get_chain();

    assert!(!local.resolve_conflicts_with(vec![("peer".to_string(), remote.get_chain())]));
    assert_eq!(local.get_chain(), local_chain);
}

#[test]
fn test_chain_with_uneven_values_stays_valid_after_transport() {
    let remote = Arc::new(new_ledger("remote-miner"));
    let alice = Wallet::new().unwrap();
    assert!(remote.add_transaction(MINING_SENDER, alice.get_address(), 62107.126000000004, None, None));
    assert!(remote.mine());
    assert!(remote.relay_transaction(&alice.sign_transaction("bob", 0.1 + 0.2).unwrap()));
    assert!(remote.mine());

    let json = serde_json::to_string(&remote.get_chain()).unwrap();
    let decoded: Vec<Block> = serde_json::from_str(&json).unwrap();
    assert!(validate_chain(&decoded, MINING_DIFFICULTY));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let remote_addr = listener.local_addr().unwrap().to_string();
    let server_ledger = Arc::clone(&remote);
    thread::spawn(move || Server::new(server_ledger).serve(listener));

    let fetched = TcpPeerClient::default().fetch_chain(&remote_addr).unwrap();
    assert_eq!(fetched, remote.get_chain());
    assert!(validate_chain(&fetched, MINING_DIFFICULTY));
}

#[test]
fn test_two_nodes_converge_over_tcp() {
    let remote = Arc::new(ledger_with_length(4));
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let remote_addr = listener.local_addr().unwrap().to_string();
    let server_ledger = Arc::clone(&remote);
    thread::spawn(move || Server::new(server_ledger).serve(listener));

    let local = Ledger::new("local-miner", 5001, Arc::new(TcpPeerClient::default())).unwrap();
    local.set_neighbors(vec![remote_addr.clone()]);

    assert!(local.resolve_conflicts());
    assert_eq!(local.get_chain(), remote.get_chain());

    // The fetched chain is the same one the remote serves
    let fetched = TcpPeerClient::default().fetch_chain(&remote_addr).unwrap();
    assert_eq!(fetched.len(), 4);
}
