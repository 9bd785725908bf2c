//! Progress narration for the update flow

use dhcli_core::Channel;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::manifest::ArtifactDescriptor;

/// A step of the update flow worth telling the user about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    FetchingManifest {
        channel: Channel,
        url: String,
    },
    VersionsCompared {
        current: String,
        manifest: String,
    },
    UpToDate {
        version: String,
    },
    ArtifactResolved {
        path: String,
        descriptor: ArtifactDescriptor,
    },
    FetchingArtifact {
        url: String,
    },
    Verifying {
        path: String,
        size: u64,
    },
    Verified {
        path: String,
    },
    InstallSkipped,
    Installing {
        executable: PathBuf,
    },
    Installed {
        executable: PathBuf,
        retained_backup: Option<PathBuf>,
    },
}

/// Receives [`UpdateEvent`]s as the flow progresses
pub trait UpdateObserver: Send + Sync {
    fn on_event(&self, event: &UpdateEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUpdateObserver;

impl UpdateObserver for TracingUpdateObserver {
    fn on_event(&self, event: &UpdateEvent) {
        match event {
            UpdateEvent::FetchingManifest { channel, url } => {
                info!(channel = %channel, url = %url, "fetching manifest")
            }
            UpdateEvent::VersionsCompared { current, manifest } => {
                info!(current = %current, manifest = %manifest, "comparing versions")
            }
            UpdateEvent::UpToDate { version } => info!(version = %version, "no update required"),
            UpdateEvent::ArtifactResolved { path, descriptor } => info!(
                path = %path,
                size = descriptor.size,
                "found manifest entry"
            ),
            UpdateEvent::FetchingArtifact { url } => info!(url = %url, "fetching artifact"),
            UpdateEvent::Verifying { path, size } => {
                info!(path = %path, size = size, "verifying downloaded artifact")
            }
            UpdateEvent::Verified { path } => info!(path = %path, "new binary verified"),
            UpdateEvent::InstallSkipped => info!("dry run, skipping binary replacement"),
            UpdateEvent::Installing { executable } => {
                info!(executable = %executable.display(), "installing")
            }
            UpdateEvent::Installed {
                executable,
                retained_backup,
            } => match retained_backup {
                Some(backup) => info!(
                    executable = %executable.display(),
                    backup = %backup.display(),
                    "update complete, previous version can be removed"
                ),
                None => info!(executable = %executable.display(), "update complete"),
            },
        }
    }
}

/// Keeps every event in order, for assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<UpdateEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UpdateEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl UpdateObserver for RecordingObserver {
    fn on_event(&self, event: &UpdateEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<T: UpdateObserver + ?Sized> UpdateObserver for Arc<T> {
    fn on_event(&self, event: &UpdateEvent) {
        (**self).on_event(event)
    }
}
