//! Error handling for the ledger node
//!
//! Rejected transactions, invalid peer chains and unreachable peers are
//! ordinary outcomes and are reported as `bool` results by the ledger. The
//! variants below cover infrastructure failures only.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger, wallet and transport operations
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// Key generation, signing or key parsing errors
    Crypto(String),
    /// Peer communication and socket errors
    Network(String),
    /// Wallet and keystore errors
    Wallet(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::Wallet(msg) => write!(f, "Wallet error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = LedgerError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = LedgerError::Config("bad port".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad port");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LedgerError = io.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
