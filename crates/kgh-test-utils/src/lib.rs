//! Testing utilities for KG-Hub redirect workspace
//!
//! Shared fixtures and an in-memory storage backend.

#![allow(missing_docs)]

use kgh_apply::{StorageClient, StorageError};
use kgh_manifest::{Manifest, ManifestEntry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Manifest text in the KG-Hub layout for `(id, download_url)` pairs
pub fn manifest_text(entries: &[(&str, &str)]) -> String {
    let mut text = String::from("# Manifest for KG-Hub graphs\n");
    for (id, url) in entries {
        let _ = write!(text, "- id: {id}\n  title: {id}\n  download_url: {url}\n");
    }
    text
}

/// In-memory manifest for `(object_key, download_url)` pairs
pub fn manifest(entries: &[(&str, &str)]) -> Manifest {
    entries
        .iter()
        .map(|(key, url)| ManifestEntry::new(*key, *url))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    PutRedirect { source: String, target: String },
    Invalidate { path: String },
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Times(u32),
    Always,
}

/// `StorageClient` that records every call and fails on request
#[derive(Debug, Default)]
pub struct RecordingStorage {
    calls: Mutex<Vec<StorageCall>>,
    put_faults: Mutex<HashMap<String, Fault>>,
    invalidate_faults: Mutex<HashMap<String, Fault>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` redirect writes at `source` with a retryable error
    pub fn fail_put(self, source: &str, times: u32) -> Self {
        self.put_faults
            .lock()
            .insert(source.to_string(), Fault::Times(times));
        self
    }

    /// Fail every redirect write at `source`
    pub fn always_fail_put(self, source: &str) -> Self {
        self.put_faults.lock().insert(source.to_string(), Fault::Always);
        self
    }

    /// Fail every invalidation of `path`
    pub fn always_fail_invalidate(self, path: &str) -> Self {
        self.invalidate_faults
            .lock()
            .insert(path.to_string(), Fault::Always);
        self
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Redirect writes as `(source, target)` pairs, in call order
    pub fn redirects(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                StorageCall::PutRedirect { source, target } => {
                    Some((source.clone(), target.clone()))
                }
                StorageCall::Invalidate { .. } => None,
            })
            .collect()
    }

    fn trip(faults: &Mutex<HashMap<String, Fault>>, path: &str) -> Result<(), StorageError> {
        let mut faults = faults.lock();
        match faults.get_mut(path) {
            Some(Fault::Always) => Err(StorageError::Unavailable(format!("injected fault at {path}"))),
            Some(Fault::Times(n)) if *n > 0 => {
                *n -= 1;
                Err(StorageError::Unavailable(format!("injected fault at {path}")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl StorageClient for RecordingStorage {
    async fn put_redirect(&self, source_path: &str, target_path: &str) -> Result<(), StorageError> {
        self.calls.lock().push(StorageCall::PutRedirect {
            source: source_path.to_string(),
            target: target_path.to_string(),
        });
        Self::trip(&self.put_faults, source_path)
    }

    async fn invalidate(&self, path: &str) -> Result<(), StorageError> {
        self.calls.lock().push(StorageCall::Invalidate {
            path: path.to_string(),
        });
        Self::trip(&self.invalidate_faults, path)
    }
}
