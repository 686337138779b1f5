//! KG-Hub manifest model and loaders
//!
//! A manifest is a snapshot of every published graph artifact together with
//! its advertised download URL. This crate turns manifest text into a
//! `Manifest` keyed by storage object key.
//!
//! # Load policy
//!
//! - The source being unreadable is fatal (`ManifestError`)
//! - A record missing its identifier or download URL is skipped and
//!   recorded as a `LoadWarning`; partial manifests are normal during
//!   staged publishing
//!
//! # Example
//!
//! ```rust,ignore
//! use kgh_manifest::{FileManifestLoader, LoaderConfig, ManifestLoader};
//!
//! let loader = FileManifestLoader::new("MANIFEST.yaml", LoaderConfig::default());
//! let report = loader.load().await?;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod entry;
pub mod error;
pub mod loader;
mod record;
mod scan;
mod yaml;

pub use entry::{Manifest, ManifestEntry};
pub use error::{EntryDefect, LoadWarning, ManifestError};
pub use loader::{
    parse_manifest, FileManifestLoader, LoadReport, LoaderConfig, ManifestFormat, ManifestLoader,
    TextManifestLoader, DEFAULT_PUBLIC_BASE_URL,
};
pub use yaml::ENTRY_CONTAINERS;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
