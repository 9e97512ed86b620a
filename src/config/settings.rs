use crate::error::{LedgerError, Result};
use std::env;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

pub const HOST_KEY: &str = "LEDGER_HOST";
pub const PORT_KEY: &str = "LEDGER_PORT";
pub const KEYSTORE_KEY: &str = "LEDGER_KEYSTORE";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_KEYSTORE_PATH: &str = "wallet.dat";

const DEFAULT_IP_RANGE: (u8, u8) = (0, 1);
const DEFAULT_PORT_RANGE: (u16, u16) = (5000, 5003);
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 20;
const DEFAULT_MINING_INTERVAL_SECS: u64 = 20;
const DEFAULT_SCAN_TIMEOUT_MS: u64 = 250;
const DEFAULT_PEER_TIMEOUT_MS: u64 = 5000;

/// Settings for one node process. Built once at startup and passed down;
/// nothing reads it through a global.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: Ipv4Addr,
    pub port: u16,
    /// Inclusive offsets added to the last octet of `host` when scanning
    pub ip_range: (u8, u8),
    /// Inclusive port range tried on every scanned host
    pub port_range: (u16, u16),
    pub neighbor_sync_interval: Duration,
    pub mining_interval: Duration,
    pub scan_timeout: Duration,
    pub peer_timeout: Duration,
    pub keystore_path: PathBuf,
    /// When non-empty, used as the neighbor set instead of range scanning
    pub static_peers: Vec<String>,
    pub mining_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: Ipv4Addr::LOCALHOST,
            port: DEFAULT_PORT,
            ip_range: DEFAULT_IP_RANGE,
            port_range: DEFAULT_PORT_RANGE,
            neighbor_sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            mining_interval: Duration::from_secs(DEFAULT_MINING_INTERVAL_SECS),
            scan_timeout: Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS),
            peer_timeout: Duration::from_millis(DEFAULT_PEER_TIMEOUT_MS),
            keystore_path: PathBuf::from(DEFAULT_KEYSTORE_PATH),
            static_peers: vec![],
            mining_enabled: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults
    pub fn from_vars<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup(HOST_KEY) {
            config.host = host
                .parse()
                .map_err(|e| LedgerError::Config(format!("Invalid {HOST_KEY} {host}: {e}")))?;
        }
        if let Some(port) = lookup(PORT_KEY) {
            config.port = port
                .parse()
                .map_err(|e| LedgerError::Config(format!("Invalid {PORT_KEY} {port}: {e}")))?;
        }
        if let Some(path) = lookup(KEYSTORE_KEY) {
            config.keystore_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// The address neighbors use to reach this node
    pub fn node_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ip_range.0 > self.ip_range.1 {
            return Err(LedgerError::Config(format!(
                "Inverted IP offset range {:?}",
                self.ip_range
            )));
        }
        if self.port_range.0 > self.port_range.1 {
            return Err(LedgerError::Config(format!(
                "Inverted port range {:?}",
                self.port_range
            )));
        }
        if self.port_range.0 == 0 {
            return Err(LedgerError::Config("Port range must start above 0".to_string()));
        }
        if self.neighbor_sync_interval.is_zero() || self.mining_interval.is_zero() {
            return Err(LedgerError::Config("Intervals must be non-zero".to_string()));
        }
        if self.scan_timeout.is_zero() || self.peer_timeout.is_zero() {
            return Err(LedgerError::Config("Timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}
