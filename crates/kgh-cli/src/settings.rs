//! Run settings
//!
//! Layered in this order, later wins:
//! 1. Built-in defaults
//! 2. TOML file given with `--config` (`[loader]`, `[resolver]`, `[storage]`)
//! 3. Command-line flags
//!
//! Writes are only enabled by `--apply`. The storage token is read from
//! `KGH_STORAGE_TOKEN` and never from the file.

use crate::cli::Invocation;
use kgh_apply::{ApplierConfig, S3StorageConfig, DEFAULT_BUCKET, DEFAULT_ENDPOINT};
use kgh_manifest::{LoaderConfig, DEFAULT_PUBLIC_BASE_URL};
use kgh_redirect::{OrphanPolicy, ResolverConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable carrying the storage bearer token
pub const TOKEN_ENV: &str = "KGH_STORAGE_TOKEN";

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("config unreadable at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML or has unknown values
    #[error("invalid config {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    /// Target bucket
    pub bucket: String,
    /// S3-compatible endpoint
    pub endpoint: String,
    /// URL prefix under which bucket objects are served
    pub public_base_url: String,
    /// Mark redirect objects world-readable
    pub public_read: bool,
    /// CDN invalidation endpoint
    pub cdn_endpoint: Option<String>,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
    /// Retries after the first attempt
    pub retry_budget: u32,
    /// Base backoff between retries in milliseconds
    pub backoff_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let applier = ApplierConfig::default();
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            public_read: true,
            cdn_endpoint: None,
            timeout_seconds: applier.timeout_seconds,
            retry_budget: applier.retry_budget,
            backoff_ms: applier.backoff_ms,
        }
    }
}

/// Effective settings for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Manifest loading
    pub loader: LoaderConfig,
    /// Resolution
    pub resolver: ResolverConfig,
    /// Storage and apply behavior
    pub storage: StorageSettings,
    /// Writes enabled
    #[serde(skip)]
    pub apply: bool,
}

impl Settings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    /// `ConfigError::Invalid` when the text is not valid TOML for these sections.
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the optional config file and apply command-line overrides
    ///
    /// # Errors
    /// Returns `ConfigError` when the given config file is unreadable or invalid.
    pub fn resolve(invocation: &Invocation) -> Result<Self, ConfigError> {
        let mut settings = match &invocation.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::Unreadable {
                        path: path.clone(),
                        source,
                    }
                })?;
                tracing::debug!(path = %path.display(), "read config file");
                Self::from_toml(path, &text)?
            }
            None => Self::default(),
        };
        settings.override_with(invocation);
        Ok(settings)
    }

    fn override_with(&mut self, inv: &Invocation) {
        self.apply = inv.apply;
        if let Some(format) = inv.format {
            self.loader.format = format;
        }
        if let Some(target) = &inv.orphan_notice {
            self.resolver.orphan_policy = OrphanPolicy::Notice {
                target: target.clone(),
            };
        }
        let storage = &mut self.storage;
        if let Some(bucket) = &inv.bucket {
            storage.bucket.clone_from(bucket);
        }
        if let Some(endpoint) = &inv.endpoint {
            storage.endpoint.clone_from(endpoint);
        }
        if let Some(cdn) = &inv.cdn_endpoint {
            storage.cdn_endpoint = Some(cdn.clone());
        }
        if let Some(seconds) = inv.timeout_seconds {
            storage.timeout_seconds = seconds;
        }
        if let Some(retries) = inv.retries {
            storage.retry_budget = retries;
        }
    }

    /// Applier configuration for this run
    #[must_use]
    pub fn applier_config(&self) -> ApplierConfig {
        ApplierConfig {
            backoff_ms: self.storage.backoff_ms,
            ..ApplierConfig::new()
                .with_bucket(self.storage.bucket.clone())
                .with_dry_run(!self.apply)
                .with_timeout_seconds(self.storage.timeout_seconds)
                .with_retry_budget(self.storage.retry_budget)
        }
    }

    /// Storage backend configuration for this run
    #[must_use]
    pub fn backend_config(&self) -> S3StorageConfig {
        S3StorageConfig {
            endpoint: self.storage.endpoint.clone(),
            bucket: self.storage.bucket.clone(),
            public_base_url: self.storage.public_base_url.clone(),
            public_read: self.storage.public_read,
            cdn_endpoint: self.storage.cdn_endpoint.clone(),
        }
    }
}

/// Storage token from the environment
#[must_use]
pub fn storage_token() -> Option<String> {
    std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
}
