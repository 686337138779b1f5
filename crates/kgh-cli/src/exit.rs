//! Process exit codes

/// Outcome of a run, as seen by the calling pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Nothing failed (including nothing to redirect)
    Success,
    /// A manifest or the configuration could not be read
    Unreadable,
    /// One or more instructions failed to apply
    ApplyFailed,
    /// Redirect cycle or conflicting redirects; nothing was written
    Refused,
}

impl Exit {
    /// Numeric process exit code
    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Unreadable => 1,
            Self::ApplyFailed => 2,
            Self::Refused => 3,
        }
    }
}
