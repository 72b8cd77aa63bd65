//! Contracts for the navigator's external collaborators.
//!
//! The snapshot provider and the metadata resolver are supplied by the
//! embedding package ecosystem; the navigator only consumes them through
//! these traits and caches what they return.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{PackageCoords, SnapshotRef, StructureSnapshot};

/// Produces full StructureDefinition snapshots for an id, canonical URL or
/// package-qualified file entry. Lookup failures (not found, ambiguous, I/O)
/// surface as errors.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn get_snapshot(
        &self,
        reference: &SnapshotRef,
        filter: Option<&PackageCoords>,
    ) -> Result<StructureSnapshot>;
}

/// Package-scoped resource metadata lookups.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Resolve to a single metadata record, `None` unless exactly one
    /// resource matches.
    async fn resolve_meta(&self, query: &MetaQuery) -> Result<Option<ResourceMeta>>;

    /// All records matching the query, in package-resolution order.
    async fn lookup(&self, query: &MetaQuery) -> Result<Vec<ResourceMeta>>;

    /// The navigator's root packages, normalized (sorted, deduplicated) and
    /// stable for the lifetime of the resolver.
    async fn normalized_root_packages(&self) -> Result<Vec<PackageCoords>>;
}

/// A metadata query: resource type and id, optionally pinned to a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaQuery {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageCoords>,
}

impl MetaQuery {
    pub fn structure_definition(id: &str, package: Option<&PackageCoords>) -> Self {
        Self {
            resource_type: "StructureDefinition".to_string(),
            id: id.to_string(),
            package: package.cloned(),
        }
    }
}

/// One metadata record as returned by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "__packageId")]
    pub package_id: String,

    #[serde(rename = "__packageVersion")]
    pub package_version: String,

    pub filename: String,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ResourceMeta {
    /// The fully-qualified snapshot reference this record points at.
    pub fn snapshot_ref(&self) -> SnapshotRef {
        SnapshotRef::Entry {
            package_id: self.package_id.clone(),
            package_version: self.package_version.clone(),
            filename: self.filename.clone(),
        }
    }
}
