//! Redirect instructions

use serde::{Deserialize, Serialize};

/// Why an instruction was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// Same object key, new download URL
    UrlChanged,
    /// Object removed; old URL points at the configured notice
    RemovalNotice,
}

/// Directive forwarding traffic from an old location to a new one
///
/// Never a no-op: `source_path != target_path` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedirectInstruction {
    object_key: String,
    source_path: String,
    target_path: String,
    reason: RedirectReason,
}

impl RedirectInstruction {
    /// Create instruction for a changed URL
    ///
    /// Returns `None` when source and target are equal.
    #[must_use]
    pub fn new(
        object_key: impl Into<String>,
        source_path: impl Into<String>,
        target_path: impl Into<String>,
    ) -> Option<Self> {
        Self::with_reason(object_key, source_path, target_path, RedirectReason::UrlChanged)
    }

    /// Create instruction with explicit reason
    #[must_use]
    pub fn with_reason(
        object_key: impl Into<String>,
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        reason: RedirectReason,
    ) -> Option<Self> {
        let source_path = source_path.into();
        let target_path = target_path.into();
        if source_path == target_path {
            return None;
        }
        Some(Self {
            object_key: object_key.into(),
            source_path,
            target_path,
            reason,
        })
    }

    /// Object key this instruction was derived from
    #[inline]
    #[must_use]
    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    /// Old location that must redirect
    #[inline]
    #[must_use]
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// New location to redirect to
    #[inline]
    #[must_use]
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Why this instruction exists
    #[inline]
    #[must_use]
    pub fn reason(&self) -> RedirectReason {
        self.reason
    }
}

impl std::fmt::Display for RedirectInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source_path, self.target_path)
    }
}
