//! `kgh-redirect` command-line tool
//!
//! Loads the current KG-Hub manifest and, given `--previous`, diffs it
//! against the earlier snapshot and writes the redirects that keep old
//! download URLs working. Dry run unless `--apply` is passed.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, including nothing to redirect |
//! | 1 | Manifest or configuration unreadable |
//! | 2 | One or more redirects failed to apply |
//! | 3 | Redirect cycle or conflicting redirects |

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod exit;
pub mod logging;
pub mod output;
pub mod run;
pub mod settings;

pub use cli::{command, Invocation, Verbosity};
pub use exit::Exit;
pub use run::run;
pub use settings::{ConfigError, Settings};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
