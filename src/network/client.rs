use crate::core::{Block, TransactionRequest};
use crate::error::{LedgerError, Result};
use crate::network::server::{Request, Response};
use crate::network::Node;
use log::debug;
use std::io::BufReader;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Default connect/read/write timeout for calls to peers
pub const PEER_TIMEOUT_MS: u64 = 5000;

/// Outbound calls the ledger makes to its neighbors.
///
/// Every method is best-effort: the ledger logs an `Err` and moves on, it
/// never retries. Swappable so tests can run ledgers without sockets.
pub trait PeerClient: Send + Sync {
    /// Tell `peer` to empty its transaction pool after we mined a block
    fn notify_pool_clear(&self, peer: &str) -> Result<()>;

    /// Relay an admitted, signed transaction to `peer`
    fn broadcast_transaction(&self, peer: &str, transaction: &TransactionRequest) -> Result<()>;

    /// Ask `peer` to run conflict resolution
    fn notify_consensus_check(&self, peer: &str) -> Result<()>;

    /// Download `peer`'s full chain
    fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>>;
}

/// Client for nodes running without any neighbors
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPeerClient;

impl PeerClient for NoopPeerClient {
    fn notify_pool_clear(&self, _peer: &str) -> Result<()> {
        Ok(())
    }

    fn broadcast_transaction(&self, _peer: &str, _transaction: &TransactionRequest) -> Result<()> {
        Ok(())
    }

    fn notify_consensus_check(&self, _peer: &str) -> Result<()> {
        Ok(())
    }

    fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>> {
        Err(LedgerError::Network(format!("No transport configured to reach {peer}")))
    }
}

/// JSON-over-TCP client speaking the server's request/response protocol
#[derive(Debug, Clone)]
pub struct TcpPeerClient {
    timeout: Duration,
}

impl Default for TcpPeerClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(PEER_TIMEOUT_MS))
    }
}

impl TcpPeerClient {
    pub fn new(timeout: Duration) -> TcpPeerClient {
        TcpPeerClient { timeout }
    }

    /// One request, one response, one connection
    pub fn call(&self, peer: &str, request: &Request) -> Result<Response> {
        let addr = Node::new(peer.to_string()).resolve_socket_addr()?;
        debug!("Sending request to {addr}: {request:?}");

        let stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| LedgerError::Network(format!("Failed to connect to {addr}: {e}")))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;

        serde_json::to_writer(&stream, request)
            .map_err(|e| LedgerError::Network(format!("Failed to send request to {addr}: {e}")))?;
        stream
            .shutdown(Shutdown::Write)
            .map_err(|e| LedgerError::Network(format!("Failed to finish request to {addr}: {e}")))?;

        serde_json::from_reader(BufReader::new(&stream))
            .map_err(|e| LedgerError::Network(format!("Bad response from {addr}: {e}")))
    }

    fn expect_success(&self, peer: &str, request: &Request) -> Result<()> {
        match self.call(peer, request)? {
            response if response.is_success() => Ok(()),
            response => Err(LedgerError::Network(format!(
                "{peer} rejected {request:?}: {response:?}"
            ))),
        }
    }
}

impl PeerClient for TcpPeerClient {
    fn notify_pool_clear(&self, peer: &str) -> Result<()> {
        self.expect_success(peer, &Request::ClearTransactions)
    }

    fn broadcast_transaction(&self, peer: &str, transaction: &TransactionRequest) -> Result<()> {
        self.expect_success(
            peer,
            &Request::RelayTransaction {
                transaction: transaction.clone(),
            },
        )
    }

    // A "fail" status only means the peer kept its own chain
    fn notify_consensus_check(&self, peer: &str) -> Result<()> {
        self.call(peer, &Request::Consensus).map(|_| ())
    }

    fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>> {
        match self.call(peer, &Request::GetChain)? {
            Response::Chain(envelope) => Ok(envelope.chain),
            other => Err(LedgerError::Network(format!(
                "Unexpected response to chain request from {peer}: {other:?}"
            ))),
        }
    }
}
