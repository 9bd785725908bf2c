//! Common test infrastructure for dhcli-update tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: versions, platform names, artifact paths
//! - `builders`: manifest and configuration builders
//! - `mock_server`: wiremock setup for manifest and artifact endpoints
//! - `files`: temporary executable helpers

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod files;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use files::*;
pub use mock_server::*;
