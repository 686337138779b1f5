//! Manifest diffing
//!
//! Joins two snapshots on object key. Keys whose download URL changed become
//! redirect instructions; keys that disappeared are orphans; keys that
//! appeared need nothing.

use crate::config::{OrphanPolicy, ResolverConfig};
use crate::error::ResolveError;
use crate::graph;
use crate::instruction::{RedirectInstruction, RedirectReason};
use kgh_manifest::{Manifest, ManifestEntry};
use serde::Serialize;
use std::collections::BTreeMap;

/// Object present in the old manifest only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Orphan {
    /// Key of the removed object
    pub object_key: String,
    /// Last advertised download URL
    pub download_url: String,
    /// Last known version label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<&ManifestEntry> for Orphan {
    fn from(entry: &ManifestEntry) -> Self {
        Self {
            object_key: entry.object_key.clone(),
            download_url: entry.download_url.clone(),
            version: entry.version.clone(),
        }
    }
}

/// Result of diffing two manifests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Instructions in object key order
    pub instructions: Vec<RedirectInstruction>,
    /// Removed objects in object key order
    pub orphans: Vec<Orphan>,
    /// Keys present only in the new manifest
    pub added: Vec<String>,
    /// Keys present in both with the same URL
    pub unchanged: usize,
}

impl Resolution {
    /// Whether nothing needs to be written
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Computes redirect instructions between manifest snapshots
///
/// Pure: holds no state between calls and performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    /// Create resolver
    #[inline]
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolver configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Diff `old` against `new`
    ///
    /// # Errors
    /// - `RedirectCycleDetected` when the instructions contain a cycle (for
    ///   example two objects swapping URLs)
    /// - `AmbiguousRedirect` when one old URL would redirect to two targets
    /// - `SourceStillPublished` when an old URL to be redirected is still the
    ///   download URL of an object in `new`
    ///
    /// Nothing is returned on error; a partial set is never handed out.
    pub fn resolve(&self, old: &Manifest, new: &Manifest) -> Result<Resolution, ResolveError> {
        let old_urls = old.url_map();
        let new_urls = new.url_map();

        let mut resolution = Resolution::default();
        let mut instructions = Vec::new();

        for (&key, &old_url) in &old_urls {
            match new_urls.get(key) {
                Some(&new_url) => match RedirectInstruction::new(key, old_url, new_url) {
                    Some(instruction) => {
                        tracing::debug!(key, "url changed: {instruction}");
                        instructions.push(instruction);
                    }
                    None => resolution.unchanged += 1,
                },
                None => {
                    tracing::info!(key, url = old_url, "orphaned object");
                    if let OrphanPolicy::Notice { target } = &self.config.orphan_policy {
                        instructions.extend(RedirectInstruction::with_reason(
                            key,
                            old_url,
                            target,
                            RedirectReason::RemovalNotice,
                        ));
                    }
                    resolution.orphans.extend(old.get(key).map(Orphan::from));
                }
            }
        }

        resolution.added = new_urls
            .keys()
            .filter(|key| !old_urls.contains_key(*key))
            .map(|key| (*key).to_string())
            .collect();

        let instructions = graph::validate(instructions)?;
        refuse_live_sources(&instructions, &new_urls)?;
        resolution.instructions = instructions;

        tracing::info!(
            redirects = resolution.instructions.len(),
            orphans = resolution.orphans.len(),
            added = resolution.added.len(),
            unchanged = resolution.unchanged,
            "resolved manifests"
        );

        Ok(resolution)
    }
}

/// Reject redirect writes onto objects the new manifest still serves
fn refuse_live_sources(
    instructions: &[RedirectInstruction],
    new_urls: &BTreeMap<&str, &str>,
) -> Result<(), ResolveError> {
    let published: BTreeMap<&str, &str> = new_urls.iter().map(|(k, u)| (*u, *k)).collect();

    match instructions
        .iter()
        .find_map(|i| published.get(i.source_path()).map(|key| (i, *key)))
    {
        Some((instruction, key)) => Err(ResolveError::SourceStillPublished {
            source_path: instruction.source_path().to_string(),
            published_by: key.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        entries
            .iter()
            .map(|(k, u)| ManifestEntry::new(*k, *u))
            .collect()
    }

    #[test]
    fn changed_url_yields_one_instruction() {
        let old = manifest(&[("k1", "/a/old.tsv")]);
        let new = manifest(&[("k1", "/a/new.tsv")]);

        let resolution = Resolver::default().resolve(&old, &new).unwrap();

        assert_eq!(
            resolution.instructions,
            vec![RedirectInstruction::new("k1", "/a/old.tsv", "/a/new.tsv").unwrap()]
        );
        assert_eq!(resolution.unchanged, 0);
    }

    #[test]
    fn identical_manifests_yield_nothing() {
        let m = manifest(&[("k1", "/a"), ("k2", "/b")]);
        let resolution = Resolver::default().resolve(&m, &m).unwrap();
        assert!(resolution.is_empty());
        assert_eq!(resolution.unchanged, 2);
    }

    #[test]
    fn orphans_are_reported_not_redirected() {
        let old = manifest(&[("gone", "/g"), ("k1", "/a")]);
        let new = manifest(&[("fresh", "/f"), ("k1", "/a")]);

        let resolution = Resolver::default().resolve(&old, &new).unwrap();

        assert!(resolution.instructions.is_empty());
        assert_eq!(resolution.orphans.len(), 1);
        assert_eq!(resolution.orphans[0].object_key, "gone");
        assert_eq!(resolution.added, vec!["fresh".to_string()]);
    }

    #[test]
    fn notice_policy_redirects_orphans() {
        let old = manifest(&[("gone", "/g"), ("k1", "/a/old")]);
        let new = manifest(&[("k1", "/a/new")]);
        let resolver = Resolver::new(ResolverConfig::new().with_orphan_policy(OrphanPolicy::Notice {
            target: "/removed.html".to_string(),
        }));

        let resolution = resolver.resolve(&old, &new).unwrap();

        let pairs: Vec<_> = resolution
            .instructions
            .iter()
            .map(|i| (i.object_key(), i.target_path(), i.reason()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("gone", "/removed.html", RedirectReason::RemovalNotice),
                ("k1", "/a/new", RedirectReason::UrlChanged),
            ]
        );
        assert_eq!(resolution.orphans.len(), 1);
    }

    #[test]
    fn swap_fails_without_instructions() {
        let old = manifest(&[("A", "/url1"), ("B", "/url2")]);
        let new = manifest(&[("A", "/url2"), ("B", "/url1")]);

        let err = Resolver::default().resolve(&old, &new).unwrap_err();
        assert!(matches!(err, ResolveError::RedirectCycleDetected { .. }));
    }

    #[test]
    fn chain_onto_live_url_is_refused() {
        let old = manifest(&[("k1", "/u1"), ("k2", "/u2")]);
        let new = manifest(&[("k1", "/u2"), ("k2", "/u3")]);

        let err = Resolver::default().resolve(&old, &new).unwrap_err();
        assert_eq!(
            err,
            ResolveError::SourceStillPublished {
                source_path: "/u2".into(),
                published_by: "k1".into(),
            }
        );
    }

    #[test]
    fn notice_onto_live_url_is_refused() {
        let old = manifest(&[("gone", "/shared")]);
        let new = manifest(&[("k1", "/shared")]);
        let resolver = Resolver::new(ResolverConfig::new().with_orphan_policy(OrphanPolicy::Notice {
            target: "/removed.html".to_string(),
        }));

        let err = resolver.resolve(&old, &new).unwrap_err();
        assert!(matches!(err, ResolveError::SourceStillPublished { .. }));
    }

    #[test]
    fn instructions_follow_key_order() {
        let old = manifest(&[("c", "/c1"), ("a", "/a1"), ("b", "/b1")]);
        let new = manifest(&[("b", "/b2"), ("c", "/c2"), ("a", "/a2")]);

        let resolution = Resolver::default().resolve(&old, &new).unwrap();
        let keys: Vec<_> = resolution.instructions.iter().map(RedirectInstruction::object_key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
