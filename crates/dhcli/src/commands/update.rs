//! Update command

use anyhow::{Context, Result};
use camino::Utf8Path;
use dhcli_core::{Channel, ConfigLoader, RuntimeConfig};
use dhcli_update::{UpdateEvent, UpdateObserver, UpdateOutcome, Updater};
use std::sync::Arc;

use crate::cli::UpdateArgs;
use crate::output;
use crate::version::current_version;

pub async fn run(args: UpdateArgs, runtime_config: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(&args, runtime_config)?;

    let updater = Updater::from_runtime_config(&config, current_version())
        .context("Failed to prepare updater")?
        .with_observer(Arc::new(ConsoleObserver));

    let channel = Channel::from_staging(args.staging);
    let outcome = updater
        .run(channel, args.dry_run)
        .await
        .context("Update failed")?;

    render_outcome(&outcome);
    Ok(())
}

fn load_config(args: &UpdateArgs, runtime_config: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let loader = match runtime_config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader
        .load()
        .context("Failed to load runtime configuration")?;
    if args.no_progress {
        config.network.show_progress = false;
    }

    tracing::debug!(
        "Update channels: production={}, staging={}, max attempts={}, progress={}",
        config.channels.production_base_url,
        config.channels.staging_base_url,
        config.retry.max_attempts,
        config.network.show_progress
    );
    Ok(config)
}

/// Narrates update steps on the terminal
struct ConsoleObserver;

impl UpdateObserver for ConsoleObserver {
    fn on_event(&self, event: &UpdateEvent) {
        match event {
            UpdateEvent::VersionsCompared { current, manifest } => {
                output::kv(" Current version", current);
                output::kv("Manifest version", manifest);
            }
            UpdateEvent::Verified { .. } => output::success("New binary successfully verified."),
            other => {
                if let Some(message) = event_message(other) {
                    output::info(&message);
                }
            }
        }
    }
}

fn event_message(event: &UpdateEvent) -> Option<String> {
    match event {
        UpdateEvent::FetchingManifest { channel, url } => {
            Some(format!("Fetching {} manifest from {} ...", channel, url))
        }
        UpdateEvent::ArtifactResolved { path, descriptor } => Some(format!(
            "Found manifest entry for '{}' ({})",
            path, descriptor
        )),
        UpdateEvent::FetchingArtifact { url } => Some(format!("Fetching {} ...", url)),
        UpdateEvent::Verifying { size, .. } => {
            Some(format!("Verifying downloaded binary ({} bytes) ...", size))
        }
        UpdateEvent::Installing { executable } => {
            Some(format!("Replacing {}", executable.display()))
        }
        _ => None,
    }
}

fn render_outcome(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::AlreadyUpToDate { .. } => output::success("No update required."),
        UpdateOutcome::DryRun { .. } => output::info("Dry run; skipping binary replacement."),
        UpdateOutcome::Updated { report, .. } => match &report.retained_backup {
            Some(backup) => {
                output::success("Update complete. The previous version can now be removed:");
                output::warning(&backup.display().to_string());
            }
            None => output::success("Update complete."),
        },
    }
}
