//! Manifest model
//!
//! A `Manifest` is a read-only snapshot of published artifacts keyed by
//! their storage object key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One published artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Stable storage path of the artifact, without a leading `/`
    pub object_key: String,
    /// Externally advertised download location
    pub download_url: String,
    /// Version label, for reporting only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Human-readable title, for reporting only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ManifestEntry {
    /// Create entry from key and URL
    #[inline]
    #[must_use]
    pub fn new(object_key: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            object_key: object_key.into(),
            download_url: download_url.into(),
            version: None,
            title: None,
        }
    }

    /// With version label
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Snapshot of published artifacts, keyed by object key
///
/// Iteration is always in object key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Create empty manifest
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry unless its key is already present
    ///
    /// Returns the rejected entry when the key is taken; the first entry
    /// for a key always wins.
    pub fn insert(&mut self, entry: ManifestEntry) -> Result<(), ManifestEntry> {
        if self.entries.contains_key(&entry.object_key) {
            return Err(entry);
        }
        self.entries.insert(entry.object_key.clone(), entry);
        Ok(())
    }

    /// Look up entry by object key
    #[inline]
    #[must_use]
    pub fn get(&self, object_key: &str) -> Option<&ManifestEntry> {
        self.entries.get(object_key)
    }

    /// Whether the key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, object_key: &str) -> bool {
        self.entries.contains_key(object_key)
    }

    /// Download URL for a key
    #[inline]
    #[must_use]
    pub fn download_url(&self, object_key: &str) -> Option<&str> {
        self.entries.get(object_key).map(|e| e.download_url.as_str())
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in object key order
    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    /// Object keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Mapping of object key to download URL
    #[must_use]
    pub fn url_map(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.download_url.as_str()))
            .collect()
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    /// Collect entries, keeping the first entry for each key
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        let mut manifest = Self::new();
        for entry in iter {
            let _ = manifest.insert(entry);
        }
        manifest
    }
}
