//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads a YAML or TOML config file, or takes the
//! equivalent command-line values, and produces a validated [`config::BridgeConfig`].

pub mod config;
