use crate::config::Config;
use log::{debug, info};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;

/// Source of the neighbor set. Each call returns the complete current set;
/// the ledger replaces its neighbors with whatever comes back.
pub trait NeighborDiscovery: Send + Sync {
    fn discover(&self) -> Vec<String>;
}

/// Scans a small block of addresses around this node's own.
///
/// Candidates are `host` with each offset in `ip_range` added to its last
/// octet, crossed with every port in `port_range`. This node's own address is
/// skipped, as is any candidate whose octet would overflow. A candidate counts
/// as a neighbor when a TCP connect succeeds within `scan_timeout`.
#[derive(Debug, Clone)]
pub struct PortRangeScanner {
    host: Ipv4Addr,
    port: u16,
    ip_range: (u8, u8),
    port_range: (u16, u16),
    scan_timeout: Duration,
}

impl PortRangeScanner {
    pub fn new(
        host: Ipv4Addr,
        port: u16,
        ip_range: (u8, u8),
        port_range: (u16, u16),
        scan_timeout: Duration,
    ) -> Self {
        Self {
            host,
            port,
            ip_range,
            port_range,
            scan_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.host,
            config.port,
            config.ip_range,
            config.port_range,
            config.scan_timeout,
        )
    }

    /// Every address the scanner would try, in scan order
    pub fn candidates(&self) -> Vec<SocketAddrV4> {
        let [a, b, c, d] = self.host.octets();
        let mut candidates = Vec::new();

        for port in self.port_range.0..=self.port_range.1 {
            for offset in self.ip_range.0..=self.ip_range.1 {
                let Some(last) = d.checked_add(offset) else {
                    continue;
                };
                let ip = Ipv4Addr::new(a, b, c, last);
                if ip == self.host && port == self.port {
                    continue;
                }
                candidates.push(SocketAddrV4::new(ip, port));
            }
        }
        candidates
    }

    fn is_reachable(&self, addr: SocketAddrV4) -> bool {
        match TcpStream::connect_timeout(&SocketAddr::V4(addr), self.scan_timeout) {
            Ok(_) => true,
            Err(e) => {
                debug!("Connect to {addr} failed: {e}");
                false
            }
        }
    }
}

impl NeighborDiscovery for PortRangeScanner {
    fn discover(&self) -> Vec<String> {
        let neighbors: Vec<String> = self
            .candidates()
            .into_iter()
            .filter(|addr| self.is_reachable(*addr))
            .map(|addr| addr.to_string())
            .collect();
        info!("Discovered {} neighbors", neighbors.len());
        neighbors
    }
}

/// A fixed neighbor list, used when peers are given on the command line
#[derive(Debug, Clone, Default)]
pub struct StaticNeighbors(Vec<String>);

impl StaticNeighbors {
    pub fn new(peers: Vec<String>) -> Self {
        StaticNeighbors(peers)
    }
}

impl NeighborDiscovery for StaticNeighbors {
    fn discover(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Static peers win over scanning when any are configured
pub fn discovery_from_config(config: &Config) -> Box<dyn NeighborDiscovery> {
    if config.static_peers.is_empty() {
        Box::new(PortRangeScanner::from_config(config))
    } else {
        Box::new(StaticNeighbors::new(config.static_peers.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn scanner(host: [u8; 4], port: u16, ip_range: (u8, u8), port_range: (u16, u16)) -> PortRangeScanner {
        PortRangeScanner::new(
            Ipv4Addr::from(host),
            port,
            ip_range,
            port_range,
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_candidates_skip_self() {
        let candidates = scanner([127, 0, 0, 1], 5000, (0, 1), (5000, 5003)).candidates();

        assert_eq!(candidates.len(), 7);
        assert!(!candidates.contains(&"127.0.0.1:5000".parse().unwrap()));
        assert!(candidates.contains(&"127.0.0.2:5000".parse().unwrap()));
        assert!(candidates.contains(&"127.0.0.1:5003".parse().unwrap()));
    }

    #[test]
    fn test_candidates_skip_octet_overflow() {
        let candidates = scanner([10, 0, 0, 255], 5000, (0, 1), (5001, 5001)).candidates();
        assert_eq!(candidates, vec!["10.0.0.255:5001".parse().unwrap()]);
    }

    #[test]
    fn test_discover_finds_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let open_port = listener.local_addr().unwrap().port();

        // Our own port is the one just below, so the listener is the only candidate
        let found = scanner([127, 0, 0, 1], open_port - 1, (0, 0), (open_port - 1, open_port)).discover();
        assert_eq!(found, vec![format!("127.0.0.1:{open_port}")]);
    }

    #[test]
    fn test_static_peers_take_precedence() {
        let config = Config {
            static_peers: vec!["10.1.1.1:5000".to_string()],
            ..Config::default()
        };
        assert_eq!(discovery_from_config(&config).discover(), vec!["10.1.1.1:5000".to_string()]);
    }
}
