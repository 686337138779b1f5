//! Run report and its renderings

use kgh_apply::{ApplyReport, OutcomeStatus};
use kgh_manifest::{LoadReport, LoadWarning, ManifestEntry};
use kgh_redirect::Resolution;
use serde::Serialize;
use std::io::{self, Write};

/// What was loaded from one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    /// Source of the manifest
    pub origin: String,
    /// Entries kept
    pub entries: usize,
    /// Records found before validation
    pub records_seen: usize,
    /// Non-fatal load problems
    pub warnings: Vec<LoadWarning>,
}

impl From<&LoadReport> for ManifestSummary {
    fn from(report: &LoadReport) -> Self {
        Self {
            origin: report.origin.clone(),
            entries: report.manifest.len(),
            records_seen: report.records_seen,
            warnings: report.warnings.clone(),
        }
    }
}

/// One line of listing mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    /// Storage object key
    pub object_key: String,
    /// Advertised download URL
    pub download_url: String,
    /// Version label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<&ManifestEntry> for ListedEntry {
    fn from(entry: &ManifestEntry) -> Self {
        Self {
            object_key: entry.object_key.clone(),
            download_url: entry.download_url.clone(),
            version: entry.version.clone(),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Current manifest, absent when it could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestSummary>,
    /// Previous manifest, when diffing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<ManifestSummary>,
    /// Why a manifest could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_load: Option<String>,
    /// Entries listed when no previous manifest was given
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listing: Vec<ListedEntry>,
    /// Diff result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Why resolution refused to produce instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refused: Option<String>,
    /// Apply outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyReport>,
}

impl RunReport {
    /// Report holding only the current manifest
    #[must_use]
    pub fn new(manifest: ManifestSummary) -> Self {
        Self {
            manifest: Some(manifest),
            ..Self::default()
        }
    }

    /// Report for a run stopped by a manifest that failed to load
    #[must_use]
    pub fn failed_load(manifest: Option<ManifestSummary>, reason: String) -> Self {
        Self {
            manifest,
            failed_load: Some(reason),
            ..Self::default()
        }
    }

    fn counts(&self) -> (usize, usize, usize) {
        self.apply
            .as_ref()
            .map_or((0, 0, 0), |a| (a.applied(), a.failed(), a.skipped()))
    }
}

/// Write the report as pretty JSON
///
/// # Errors
/// Propagates write failures.
pub fn write_json(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

/// Write the human-readable summary
///
/// # Errors
/// Propagates write failures.
pub fn write_summary(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    if let Some(manifest) = &report.manifest {
        write_manifest(out, "manifest", manifest)?;
    }
    if let Some(previous) = &report.previous {
        write_manifest(out, "previous", previous)?;
    }

    if let Some(reason) = &report.failed_load {
        writeln!(out, "load failed: {reason}")?;
        writeln!(out, "redirects computed: 0 (load failed)")?;
    } else if report.previous.is_none() {
        for entry in &report.listing {
            writeln!(out, "{}\t{}", entry.object_key, entry.download_url)?;
        }
        writeln!(out, "{} download URLs listed", report.listing.len())?;
        writeln!(out, "redirects computed: 0 (no previous manifest)")?;
    }

    if let Some(reason) = &report.refused {
        writeln!(out, "redirects refused: {reason}")?;
    }

    if let Some(resolution) = &report.resolution {
        writeln!(
            out,
            "redirects computed: {} ({} unchanged, {} added, {} orphaned)",
            resolution.instructions.len(),
            resolution.unchanged,
            resolution.added.len(),
            resolution.orphans.len()
        )?;
        for orphan in &resolution.orphans {
            writeln!(out, "  orphan: {} ({})", orphan.object_key, orphan.download_url)?;
        }
    }

    if let Some(apply) = &report.apply {
        writeln!(out, "mode: {}, bucket: {}", apply.mode, apply.bucket)?;
        for outcome in &apply.outcomes {
            let status = match &outcome.status {
                OutcomeStatus::Applied { .. } => "applied".to_string(),
                OutcomeStatus::Skipped => "skipped".to_string(),
                OutcomeStatus::Failed(failure) => format!("failed: {failure}"),
            };
            writeln!(out, "  {} [{status}]", outcome.instruction)?;
        }
    }

    let (applied, failed, skipped) = report.counts();
    writeln!(
        out,
        "redirects applied: {applied}, failed: {failed}, skipped: {skipped}"
    )
}

fn write_manifest(out: &mut impl Write, label: &str, summary: &ManifestSummary) -> io::Result<()> {
    writeln!(
        out,
        "{label} {}: {} entries loaded, {} warnings",
        summary.origin,
        summary.entries,
        summary.warnings.len()
    )?;
    for warning in &summary.warnings {
        writeln!(out, "  warning: {warning}")?;
    }
    Ok(())
}
