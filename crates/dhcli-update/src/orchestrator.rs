//! End-to-end update flow
//!
//! ```no_run
//! use dhcli_core::{Channel, ConfigLoader};
//! use dhcli_update::Updater;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     let updater = Updater::from_runtime_config(&config, "abc123")?;
//!     let outcome = updater.run(Channel::Production, false).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

use dhcli_core::types::ChannelConfig;
use dhcli_core::{Channel, Platform, RuntimeConfig, BINARY_NAME};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::fetcher::{Fetch, HttpFetcher};
use crate::installer::{current_executable, FileOps, InstallReport, Installer, StdFileOps};
use crate::manifest::Manifest;
use crate::observer::{TracingUpdateObserver, UpdateEvent, UpdateObserver};
use crate::planner::{plan, Plan};
use crate::verifier::verify;

/// Everything the flow needs to know up front
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub channels: ChannelConfig,
    pub binary_name: String,
    pub current_version: String,
    pub platform: Platform,

    /// Install target; the running executable when `None`
    pub executable_path: Option<PathBuf>,
}

impl UpdateConfig {
    pub fn new(channels: ChannelConfig, current_version: impl Into<String>) -> Self {
        Self {
            channels,
            binary_name: BINARY_NAME.to_string(),
            current_version: current_version.into(),
            platform: Platform::current(),
            executable_path: None,
        }
    }

    pub fn from_runtime(config: &RuntimeConfig, current_version: impl Into<String>) -> Self {
        Self::new(config.channels.clone(), current_version)
    }

    pub fn with_executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_binary_name(mut self, binary_name: impl Into<String>) -> Self {
        self.binary_name = binary_name.into();
        self
    }

    pub fn manifest_url(&self, channel: Channel) -> String {
        join_url(
            self.channels.base_url(channel),
            &self.channels.manifest_name,
        )
    }

    pub fn artifact_url(&self, channel: Channel, path: &str) -> String {
        join_url(self.channels.base_url(channel), path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The published version is the running version
    AlreadyUpToDate { version: String },

    /// The artifact was fetched and verified but not installed
    DryRun { version: String, artifact: String },

    /// The executable was replaced
    Updated {
        version: String,
        report: InstallReport,
    },
}

/// Runs the update flow: manifest, plan, artifact, verify, install
pub struct Updater<F = HttpFetcher, O = StdFileOps> {
    config: UpdateConfig,
    fetcher: F,
    installer: Installer<O>,
    observer: Arc<dyn UpdateObserver>,
}

impl Updater<HttpFetcher, StdFileOps> {
    /// Production updater: HTTP fetcher, real filesystem, this platform
    pub fn from_runtime_config(
        runtime: &RuntimeConfig,
        current_version: impl Into<String>,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::from_runtime_config(runtime)?;
        Ok(Self::new(
            UpdateConfig::from_runtime(runtime, current_version),
            fetcher,
        ))
    }
}

impl<F: Fetch> Updater<F, StdFileOps> {
    pub fn new(config: UpdateConfig, fetcher: F) -> Self {
        let installer = Installer::new(config.platform.clone(), config.binary_name.clone());
        Self {
            config,
            fetcher,
            installer,
            observer: Arc::new(TracingUpdateObserver),
        }
    }
}

impl<F: Fetch, O: FileOps> Updater<F, O> {
    /// Replace the installer, e.g. to inject filesystem failures
    pub fn with_installer<O2: FileOps>(self, installer: Installer<O2>) -> Updater<F, O2> {
        Updater {
            config: self.config,
            fetcher: self.fetcher,
            installer,
            observer: self.observer,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn UpdateObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Run the update flow against `channel`
    ///
    /// With `dry_run` the artifact is still fetched and verified; only the
    /// install is skipped.
    pub async fn run(&self, channel: Channel, dry_run: bool) -> Result<UpdateOutcome> {
        let manifest_url = self.config.manifest_url(channel);
        self.emit(UpdateEvent::FetchingManifest {
            channel,
            url: manifest_url.clone(),
        });

        let payload = self.fetcher.fetch(&manifest_url).await?;
        let manifest = Manifest::parse(&payload)?;
        debug!(version = %manifest.version, files = manifest.files.len(), "manifest parsed");

        self.emit(UpdateEvent::VersionsCompared {
            current: self.config.current_version.clone(),
            manifest: manifest.version.clone(),
        });

        let (path, descriptor) = match plan(
            &self.config.current_version,
            &manifest,
            &self.config.platform,
            &self.config.binary_name,
        )? {
            Plan::UpToDate => {
                self.emit(UpdateEvent::UpToDate {
                    version: manifest.version.clone(),
                });
                return Ok(UpdateOutcome::AlreadyUpToDate {
                    version: manifest.version.clone(),
                });
            }
            Plan::Update { path, descriptor } => (path, descriptor),
        };

        self.emit(UpdateEvent::ArtifactResolved {
            path: path.clone(),
            descriptor: descriptor.clone(),
        });

        let artifact_url = self.config.artifact_url(channel, &path);
        self.emit(UpdateEvent::FetchingArtifact {
            url: artifact_url.clone(),
        });
        let artifact = self.fetcher.fetch_artifact(&artifact_url).await?;

        self.emit(UpdateEvent::Verifying {
            path: path.clone(),
            size: artifact.len() as u64,
        });
        verify(&artifact, descriptor)?;
        self.emit(UpdateEvent::Verified { path: path.clone() });

        if dry_run {
            self.emit(UpdateEvent::InstallSkipped);
            return Ok(UpdateOutcome::DryRun {
                version: manifest.version,
                artifact: path,
            });
        }

        let executable = match &self.config.executable_path {
            Some(path) => path.clone(),
            None => current_executable()?,
        };
        self.emit(UpdateEvent::Installing {
            executable: executable.clone(),
        });

        let report = self.installer.install(&artifact, &executable)?;
        self.emit(UpdateEvent::Installed {
            executable: report.executable.clone(),
            retained_backup: report.retained_backup.clone(),
        });

        Ok(UpdateOutcome::Updated {
            version: manifest.version,
            report,
        })
    }

    fn emit(&self, event: UpdateEvent) {
        self.observer.on_event(&event);
    }
}
