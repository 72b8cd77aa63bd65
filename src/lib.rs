//! # OctoFHIR Structure Navigator
//!
//! An async path-resolution engine over FHIR StructureDefinition snapshots.
//! Given a snapshot (an ordered list of element definitions) and an
//! FSH-style dotted path, the navigator returns either the single matching
//! element or the immediate children of that element.
//!
//! The resolver understands:
//! - polymorphic ("choice type") narrowing in its three syntaxes
//!   (`valueString`, `value[string]`, `value[x]`),
//! - slice resolution, including virtual slices that hop into a standalone
//!   profile (`extension[us-core-race]`),
//! - cross-snapshot rebasing through base types, profiles and
//!   `contentReference`,
//! - one-time snapshot enrichment (origin tagging, verbose-field stripping,
//!   FSH `__name` computation, type `__kind` classification).
//!
//! Snapshots and resource metadata come from pluggable asynchronous
//! collaborators ([`SnapshotProvider`], [`MetadataResolver`]); everything
//! they return flows through two-tier caches (hot LRU plus an optional
//! shared cold tier) whose keys are namespaced by the navigator's package
//! context, so navigators with different root packages can safely share a
//! cold store.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use octofhir_fhirnav::prelude::*;
//!
//! # async fn demo(snapshots: Arc<dyn SnapshotProvider>, metadata: Arc<dyn MetadataResolver>)
//! # -> octofhir_fhirnav::Result<()> {
//! let navigator = StructureNavigator::new(snapshots, metadata).await?;
//!
//! let gender = navigator.get_element("us-core-patient", "gender").await?;
//! assert_eq!(gender.path, "Patient.gender");
//!
//! let value = navigator.get_element("Extension", "valueString").await?;
//! assert_eq!(value.names.as_deref(), Some(&["valueString".to_string()][..]));
//!
//! let children = navigator.get_children("Patient", "identifier").await?;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

// Public API modules
pub mod navigator;
pub mod path;
pub mod provider;
pub mod storage;
pub mod types;

// Internal modules
mod enrich;
mod error;
mod resolver;

// Re-exports for convenience
pub use error::{NavigatorError, Result};
pub use navigator::{ColdCaches, NavigatorOptions, StructureNavigator};

/// Convenient prelude for common imports.
pub mod prelude {
    pub use crate::error::{NavigatorError, Result};
    pub use crate::navigator::{ColdCaches, NavigatorOptions, StructureNavigator};
    pub use crate::provider::{MetaQuery, MetadataResolver, ResourceMeta, SnapshotProvider};
    pub use crate::storage::{CacheConfig, CacheKey, CacheStore, KeyPart, TieredCache};
    pub use crate::types::{
        ElementConstraint, ElementDefinition, ElementType, PackageCoords, SnapshotRef,
        StructureSnapshot,
    };
}
