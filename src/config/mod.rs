//! Configuration management
//!
//! This module holds the node settings: listen address, neighbor scan ranges,
//! loop intervals, timeouts and the keystore location.
//!
//! Environment variables provide defaults; command-line flags override them.

pub mod settings;

pub use settings::{
    Config, DEFAULT_KEYSTORE_PATH, DEFAULT_PORT, HOST_KEY, KEYSTORE_KEY, PORT_KEY,
};
