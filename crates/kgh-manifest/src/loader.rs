//! Manifest loaders
//!
//! `ManifestLoader` abstracts where manifest text comes from. Both loaders
//! here share `parse_manifest`, which applies the skip-and-warn policy:
//! a bad record never fails the whole load.

use crate::entry::Manifest;
use crate::error::{LoadWarning, ManifestError};
use crate::record::{self, RawRecord};
use crate::{scan, yaml};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Public base URL of KG-Hub downloads
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://kg-hub.berkeleybop.io/";

/// How manifest text is split into records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    /// Structured YAML, falling back to line scanning on syntax errors
    #[default]
    Auto,
    /// Structured YAML only; syntax errors are fatal
    Yaml,
    /// Line scanning only
    Lines,
}

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Record splitting strategy
    pub format: ManifestFormat,
    /// Labels naming the object identifier, tried in order
    pub identifier_fields: Vec<String>,
    /// Label of the download URL field
    pub url_field: String,
    /// Label of the version field
    pub version_field: String,
    /// Label of the title field
    pub title_field: String,
    /// Prefix stripped from identifiers to obtain storage object keys
    pub public_base_url: Option<String>,
}

impl LoaderConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With record format
    #[inline]
    #[must_use]
    pub fn with_format(mut self, format: ManifestFormat) -> Self {
        self.format = format;
        self
    }

    /// With identifier labels
    #[must_use]
    pub fn with_identifier_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// With public base URL (`None` keeps identifiers verbatim)
    #[inline]
    #[must_use]
    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base;
        self
    }

    /// Derive the storage object key for an identifier
    #[must_use]
    pub fn object_key_for(&self, identifier: &str) -> String {
        let stripped = self
            .public_base_url
            .as_deref()
            .and_then(|base| identifier.strip_prefix(base))
            .unwrap_or(identifier);
        stripped.trim().trim_start_matches('/').to_string()
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            format: ManifestFormat::Auto,
            identifier_fields: vec!["object_key".to_string(), "id".to_string()],
            url_field: "download_url".to_string(),
            version_field: "version".to_string(),
            title_field: "title".to_string(),
            public_base_url: Some(DEFAULT_PUBLIC_BASE_URL.to_string()),
        }
    }
}

/// Result of a successful load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Where the manifest came from
    pub origin: String,
    /// The loaded snapshot
    pub manifest: Manifest,
    /// Non-fatal problems, in source order
    pub warnings: Vec<LoadWarning>,
    /// Records found before validation
    pub records_seen: usize,
}

impl LoadReport {
    /// Number of records skipped as malformed
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_skipped_entry()).count()
    }
}

/// Parse manifest text
///
/// # Errors
/// Returns `ManifestError::Syntax` only for `ManifestFormat::Yaml` when the
/// document is not valid YAML. Malformed records are reported as warnings.
pub fn parse_manifest(
    origin: &str,
    text: &str,
    config: &LoaderConfig,
) -> Result<LoadReport, ManifestError> {
    let mut warnings = Vec::new();

    let records: Vec<RawRecord> = match config.format {
        ManifestFormat::Lines => scan::scan_records(text),
        ManifestFormat::Yaml => {
            yaml::read_records(text).map_err(|msg| ManifestError::syntax(origin, msg))?
        }
        ManifestFormat::Auto => match yaml::read_records(text) {
            Ok(records) => records,
            Err(reason) => {
                let warning = LoadWarning::FellBackToLineScan { reason };
                tracing::warn!(origin, "{warning}");
                warnings.push(warning);
                scan::scan_records(text)
            }
        },
    };

    let assembled = record::assemble(records, config);
    warnings.extend(assembled.warnings);

    tracing::info!(
        origin,
        entries = assembled.manifest.len(),
        skipped = assembled.records_seen - assembled.manifest.len(),
        "loaded manifest"
    );

    Ok(LoadReport {
        origin: origin.to_string(),
        manifest: assembled.manifest,
        warnings,
        records_seen: assembled.records_seen,
    })
}

/// Source of manifest snapshots
///
/// Implement this trait to load manifests from places other than the local
/// filesystem (an object store listing, an HTTP endpoint).
#[async_trait::async_trait]
pub trait ManifestLoader: Send + Sync {
    /// Human-readable description of the source
    fn origin(&self) -> String;

    /// Load and parse the manifest
    async fn load(&self) -> Result<LoadReport, ManifestError>;
}

/// Loads a manifest file from disk
#[derive(Debug, Clone)]
pub struct FileManifestLoader {
    path: PathBuf,
    config: LoaderConfig,
}

impl FileManifestLoader {
    /// Create loader for path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, config: LoaderConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Path being loaded
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ManifestLoader for FileManifestLoader {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<LoadReport, ManifestError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ManifestError::unreadable(&self.path, e))?;
        let origin = self.origin();

        let text = String::from_utf8_lossy(&bytes);
        let lossy = matches!(text, Cow::Owned(_));
        let mut report = parse_manifest(&origin, &text, &self.config)?;
        if lossy {
            let warning = LoadWarning::InvalidUtf8;
            tracing::warn!(origin = %origin, "{warning}");
            report.warnings.insert(0, warning);
        }
        Ok(report)
    }
}

/// Loads a manifest already held in memory
#[derive(Debug, Clone)]
pub struct TextManifestLoader {
    origin: String,
    text: String,
    config: LoaderConfig,
}

impl TextManifestLoader {
    /// Create loader over text
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>, text: impl Into<String>, config: LoaderConfig) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl ManifestLoader for TextManifestLoader {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    async fn load(&self) -> Result<LoadReport, ManifestError> {
        parse_manifest(&self.origin, &self.text, &self.config)
    }
}
