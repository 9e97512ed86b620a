//! Command-line interface
//!
//! This module contains the CLI commands and argument parsing: one command to
//! run a node, the rest act as a wallet client against a running node.

pub mod commands;

pub use commands::{Command, Opt, DEFAULT_NODE};
