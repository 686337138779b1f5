//! Resolve-stage errors
//!
//! Every variant is fatal: the run stops before any storage write, since
//! redirect writes are not applied atomically as a set.

/// Errors computing redirect instructions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Following the instructions from a source leads back to it
    #[error("redirect cycle detected: {}", .cycle.join(" -> "))]
    RedirectCycleDetected {
        /// Paths on the cycle, first path repeated at the end
        cycle: Vec<String>,
    },

    /// One source would redirect to several targets
    #[error("ambiguous redirect from {source_path}: {}", .targets.join(", "))]
    AmbiguousRedirect {
        /// The contested source
        source_path: String,
        /// Every target claimed for it, sorted
        targets: Vec<String>,
    },

    /// A source is still the download URL of an object in the new manifest
    #[error("redirect from {source_path} would overwrite the live download of '{published_by}'")]
    SourceStillPublished {
        /// Old URL that would be overwritten
        source_path: String,
        /// Object key now published at that URL
        published_by: String,
    },
}

impl ResolveError {
    /// Create cycle error
    pub fn cycle(cycle: Vec<String>) -> Self {
        Self::RedirectCycleDetected { cycle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_walks_the_ring() {
        let err = ResolveError::cycle(vec!["/a".into(), "/b".into(), "/a".into()]);
        assert_eq!(err.to_string(), "redirect cycle detected: /a -> /b -> /a");
    }

    #[test]
    fn ambiguous_display_lists_targets() {
        let err = ResolveError::AmbiguousRedirect {
            source_path: "/a".into(),
            targets: vec!["/b".into(), "/c".into()],
        };
        assert_eq!(err.to_string(), "ambiguous redirect from /a: /b, /c");
    }
}
