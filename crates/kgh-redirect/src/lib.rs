//! KG-Hub redirect resolution
//!
//! Diffs an old and a new manifest snapshot and computes the redirect
//! instructions that keep previously published download URLs working.
//!
//! # Guarantees
//!
//! - At most one instruction per changed object key
//! - Instructions come out in object key order, so reruns are reproducible
//! - No-op redirects (source equals target) are never emitted
//! - Cyclic or conflicting instruction sets are refused as a whole
//! - An old URL that the new manifest still serves is never overwritten
//!
//! # Example
//!
//! ```rust,ignore
//! use kgh_redirect::{Resolver, ResolverConfig};
//!
//! let resolution = Resolver::new(ResolverConfig::default()).resolve(&old, &new)?;
//! for instruction in &resolution.instructions {
//!     println!("{instruction}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
mod graph;
pub mod instruction;
pub mod resolver;

pub use config::{OrphanPolicy, ResolverConfig};
pub use error::ResolveError;
pub use instruction::{RedirectInstruction, RedirectReason};
pub use resolver::{Orphan, Resolution, Resolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
