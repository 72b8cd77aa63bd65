use std::sync::Arc;

use crate::error::Result;
use crate::path::split_fsh_path;
use crate::provider::{MetadataResolver, ResourceMeta, SnapshotProvider};
use crate::storage::{CacheConfig, CacheStore, TieredCache};
use crate::types::{ElementDefinition, SnapshotRef, StructureSnapshot};

/// Optional cold tiers for the navigator's caches. Any subset may be
/// attached; cold tiers are shared with other navigators and processes, so
/// their lifetime is the caller's business.
#[derive(Default)]
pub struct ColdCaches {
    pub snapshot: Option<Arc<dyn CacheStore<StructureSnapshot>>>,
    pub type_meta: Option<Arc<dyn CacheStore<ResourceMeta>>>,
    pub element: Option<Arc<dyn CacheStore<ElementDefinition>>>,
    pub children: Option<Arc<dyn CacheStore<Vec<ElementDefinition>>>>,
}

#[derive(Default)]
pub struct NavigatorOptions {
    pub cache: CacheConfig,
    pub cold: ColdCaches,
}

/// Path-resolution facade over StructureDefinition snapshots.
///
/// Holds the snapshot provider, the metadata resolver and four caches. The
/// package-context string is computed once at construction and namespaces
/// the element and children cache keys, so navigators with different root
/// packages can share a cold tier without collisions.
pub struct StructureNavigator {
    pub(crate) snapshots: Arc<dyn SnapshotProvider>,
    pub(crate) metadata: Arc<dyn MetadataResolver>,
    pub(crate) snapshot_cache: TieredCache<StructureSnapshot>,
    pub(crate) type_meta_cache: TieredCache<ResourceMeta>,
    pub(crate) element_cache: TieredCache<ElementDefinition>,
    pub(crate) children_cache: TieredCache<Vec<ElementDefinition>>,
    pub(crate) package_context: String,
}

impl std::fmt::Debug for StructureNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructureNavigator")
            .field("package_context", &self.package_context)
            .finish_non_exhaustive()
    }
}

impl StructureNavigator {
    pub async fn new(
        snapshots: Arc<dyn SnapshotProvider>,
        metadata: Arc<dyn MetadataResolver>,
    ) -> Result<Self> {
        Self::with_options(snapshots, metadata, NavigatorOptions::default()).await
    }

    pub async fn with_options(
        snapshots: Arc<dyn SnapshotProvider>,
        metadata: Arc<dyn MetadataResolver>,
        options: NavigatorOptions,
    ) -> Result<Self> {
        let packages = metadata.normalized_root_packages().await?;
        let package_context = serde_json::to_string(&packages)?;

        Ok(Self {
            snapshots,
            metadata,
            snapshot_cache: TieredCache::new(
                options.cache.snapshot_capacity,
                options.cold.snapshot,
            )?,
            type_meta_cache: TieredCache::new(
                options.cache.type_meta_capacity,
                options.cold.type_meta,
            )?,
            element_cache: TieredCache::new(options.cache.element_capacity, options.cold.element)?,
            children_cache: TieredCache::new(
                options.cache.children_capacity,
                options.cold.children,
            )?,
            package_context,
        })
    }

    /// Resolve an FSH-style dotted path to a single enriched element.
    pub async fn get_element(
        &self,
        snapshot: impl Into<SnapshotRef>,
        fsh_path: &str,
    ) -> Result<ElementDefinition> {
        let reference = snapshot.into();
        let segments = split_fsh_path(fsh_path);
        self.resolve_path(&reference, &segments, None, None).await
    }

    /// Resolve a path and return the immediate children of the matching
    /// element, in snapshot order.
    pub async fn get_children(
        &self,
        snapshot: impl Into<SnapshotRef>,
        fsh_path: &str,
    ) -> Result<Vec<ElementDefinition>> {
        let reference = snapshot.into();
        self.resolve_children(&reference, fsh_path, None).await
    }

    pub fn snapshots(&self) -> &Arc<dyn SnapshotProvider> {
        &self.snapshots
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataResolver> {
        &self.metadata
    }
}
