use crate::error::{LedgerError, Result};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A neighbor peer, addressed as `host:port`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    addr: String,
}

impl Node {
    pub fn new(addr: String) -> Node {
        Node { addr }
    }

    pub fn get_addr(&self) -> &str {
        self.addr.as_str()
    }

    pub fn resolve_socket_addr(&self) -> Result<SocketAddr> {
        self.addr
            .to_socket_addrs()
            .map_err(|e| LedgerError::Network(format!("Invalid address {}: {e}", self.addr)))?
            .next()
            .ok_or_else(|| LedgerError::Network(format!("No address found for {}", self.addr)))
    }
}

/// The neighbor set, behind its own lock so discovery never waits on mining.
/// Refreshes replace the whole set.
pub struct Nodes {
    inner: Mutex<Vec<Node>>,
}

impl Default for Nodes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nodes {
    pub fn new() -> Nodes {
        Nodes {
            inner: Mutex::new(vec![]),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Node>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in a freshly discovered set; duplicates keep their first position
    pub fn replace_all(&self, addrs: Vec<String>) {
        let mut nodes: Vec<Node> = Vec::with_capacity(addrs.len());
        for addr in addrs {
            if !nodes.iter().any(|n| n.addr == addr) {
                nodes.push(Node::new(addr));
            }
        }
        *self.lock() = nodes;
    }

    pub fn get_addrs(&self) -> Vec<String> {
        self.lock().iter().map(|n| n.addr.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn node_is_known(&self, addr: &str) -> bool {
        self.lock().iter().any(|x| x.get_addr() == addr)
    }
}
