//! Peer-to-peer networking
//!
//! This module handles communication between ledger nodes: the JSON-over-TCP
//! server and client, neighbor discovery, and the background loops that keep
//! neighbors and chains in sync.

pub mod client;
pub mod discovery;
pub mod node;
pub mod server;
pub mod sync;

pub use client::{NoopPeerClient, PeerClient, TcpPeerClient, PEER_TIMEOUT_MS};
pub use discovery::{discovery_from_config, NeighborDiscovery, PortRangeScanner, StaticNeighbors};
pub use node::{Node, Nodes};
pub use server::{handle_request, ChainEnvelope, Request, Response, Server};
pub use sync::BackgroundTasks;
