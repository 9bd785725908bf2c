//! Type definitions for dhcli runtime configuration and release platforms

mod platform;
mod runtime_config;

pub use platform::*;
pub use runtime_config::*;
