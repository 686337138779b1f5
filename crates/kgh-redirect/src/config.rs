//! Resolver configuration

use serde::{Deserialize, Serialize};

/// What to do with objects present only in the old manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// List orphans in the resolution; emit no instruction
    #[default]
    Report,
    /// Redirect each orphan's old URL to a fixed removal notice
    Notice {
        /// Notice location
        target: String,
    },
}

/// Resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Orphan handling
    pub orphan_policy: OrphanPolicy,
}

impl ResolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With orphan policy
    #[inline]
    #[must_use]
    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }
}
