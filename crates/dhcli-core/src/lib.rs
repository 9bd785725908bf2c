//! # dhcli-core
//!
//! Core library for the dhcli CLI providing:
//! - Runtime configuration types and the layered configuration loader
//! - Release platform identification (`<os>/<arch>` naming)
//! - Retry execution engine with policy-based configuration

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use types::{Channel, Platform, RuntimeConfig};

/// Name of the binary published by the release system
pub const BINARY_NAME: &str = "dhcli";
