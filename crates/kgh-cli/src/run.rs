//! One resolver run: load, resolve, apply, report
//!
//! Load and resolve failures stop the run before any storage call; the
//! summary is still written with whatever did load.
//! Apply failures never do; they only change the exit code.

use crate::cli::Invocation;
use crate::exit::Exit;
use crate::output::{self, ListedEntry, ManifestSummary, RunReport};
use crate::settings::Settings;
use anyhow::Context;
use kgh_apply::{Applier, StorageClient};
use kgh_manifest::{FileManifestLoader, LoadReport, ManifestError, ManifestLoader};
use kgh_redirect::Resolver;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Execute a run, writing the summary or JSON report to `out`
///
/// # Errors
/// Only when writing to `out` fails; every domain failure maps to an `Exit`.
pub async fn run(
    invocation: &Invocation,
    settings: &Settings,
    storage: Arc<dyn StorageClient>,
    out: &mut impl Write,
) -> anyhow::Result<Exit> {
    let current = match load(&invocation.manifest, settings).await {
        Ok(current) => current,
        Err(err) => {
            emit(invocation, out, &RunReport::failed_load(None, err.to_string()))?;
            return Ok(Exit::Unreadable);
        }
    };
    let mut report = RunReport::new(ManifestSummary::from(&current));

    let Some(previous_path) = &invocation.previous else {
        tracing::info!("no previous manifest given, listing download URLs only");
        report.listing = current.manifest.entries().map(ListedEntry::from).collect();
        emit(invocation, out, &report)?;
        return Ok(Exit::Success);
    };

    let previous = match load(previous_path, settings).await {
        Ok(previous) => previous,
        Err(err) => {
            report.failed_load = Some(err.to_string());
            emit(invocation, out, &report)?;
            return Ok(Exit::Unreadable);
        }
    };
    report.previous = Some(ManifestSummary::from(&previous));

    let resolver = Resolver::new(settings.resolver.clone());
    let resolution = match resolver.resolve(&previous.manifest, &current.manifest) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::error!("{err}; no redirects written");
            report.refused = Some(err.to_string());
            emit(invocation, out, &report)?;
            return Ok(Exit::Refused);
        }
    };

    let applier = Applier::new(settings.applier_config(), storage);
    let applied = applier.apply(&resolution.instructions).await;
    let exit = if applied.is_success() {
        Exit::Success
    } else {
        Exit::ApplyFailed
    };

    report.resolution = Some(resolution);
    report.apply = Some(applied);
    emit(invocation, out, &report)?;
    Ok(exit)
}

async fn load(path: &Path, settings: &Settings) -> Result<LoadReport, ManifestError> {
    let loader = FileManifestLoader::new(path, settings.loader.clone());
    let loaded = loader.load().await;
    if let Err(err) = &loaded {
        tracing::error!("{err}");
    }
    loaded
}

fn emit(invocation: &Invocation, out: &mut impl Write, report: &RunReport) -> anyhow::Result<()> {
    if invocation.json {
        output::write_json(out, report).context("failed to write JSON report")
    } else {
        output::write_summary(out, report).context("failed to write summary")
    }
}
