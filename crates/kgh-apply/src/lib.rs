//! KG-Hub redirect application
//!
//! Turns validated `RedirectInstruction`s into storage writes:
//! a redirect write at each old location, then a CDN invalidation of it.
//!
//! # Architecture
//!
//! ```text
//! Resolution → Applier ──(timeout, retry)──→ StorageClient
//!                 ↓                            ├─ S3WebsiteStorage
//!             ApplyReport                      └─ test doubles
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kgh_apply::{Applier, ApplierConfig, S3StorageConfig, S3WebsiteStorage};
//! use std::sync::Arc;
//!
//! let storage = Arc::new(S3WebsiteStorage::new(S3StorageConfig::default()));
//! let applier = Applier::new(ApplierConfig::new().with_dry_run(false), storage);
//! let report = applier.apply(&resolution.instructions).await;
//! assert!(report.is_success());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod applier;
pub mod config;
pub mod error;
pub mod report;
pub mod s3;
pub mod storage;

pub use applier::Applier;
pub use config::{ApplierConfig, RetryPolicy, DEFAULT_BUCKET};
pub use error::{ApplyFailure, ApplyStage, StorageError};
pub use report::{ApplyMode, ApplyReport, InstructionOutcome, OutcomeStatus};
pub use s3::{S3StorageConfig, S3WebsiteStorage, DEFAULT_ENDPOINT};
pub use storage::StorageClient;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
