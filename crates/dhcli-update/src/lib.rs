//! Self-update functionality for the dhcli CLI
//!
//! Provides:
//! - Manifest fetching with bounded retry and a fixed identifying header
//! - Platform artifact resolution against the release manifest
//! - Size and SHA-512 verification of downloaded artifacts
//! - In-place replacement of the running executable with rollback
//! - Step-by-step narration through [`UpdateObserver`]

pub mod error;
pub mod fetcher;
pub mod installer;
pub mod manifest;
pub mod observer;
pub mod orchestrator;
pub mod planner;
pub mod verifier;

pub use error::{ErrorKind, InstallStep, IntegrityError, Result, RollbackOutcome, UpdateError};
pub use fetcher::{Fetch, HttpFetcher};
pub use installer::{FileOps, InstallReport, Installer, StdFileOps};
pub use manifest::{ArtifactDescriptor, Manifest};
pub use observer::{RecordingObserver, TracingUpdateObserver, UpdateEvent, UpdateObserver};
pub use orchestrator::{UpdateConfig, UpdateOutcome, Updater};
pub use planner::{plan, Plan};
pub use verifier::{sha512_hex, verify};
