//! The path-resolution engine: a state machine over FSH path segments with
//! per-prefix element caching, polymorphic narrowing, slice resolution and
//! cross-snapshot rebasing.

mod children;
mod choice;
mod rebase;
mod slicing;

use std::future::Future;
use std::pin::Pin;

use crate::error::{NavigatorError, Result};
use crate::navigator::StructureNavigator;
use crate::path::{initcap, parse_segment};
use crate::resolver::choice::match_element;
use crate::resolver::slicing::SliceOutcome;
use crate::storage::{CacheKey, KeyPart};
use crate::types::{ElementDefinition, ElementType, PackageCoords, SnapshotRef, StructureSnapshot};

type ResolveFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub(crate) fn scoped_key(namespace: &str, snapshot_id: &str, path: &str) -> CacheKey {
    vec![
        KeyPart::from(namespace),
        KeyPart::from(snapshot_id),
        KeyPart::from(path),
    ]
}

impl StructureNavigator {
    /// Fetch a snapshot through the snapshot cache, enriching it on first
    /// contact.
    pub(crate) async fn fetch_snapshot(
        &self,
        reference: &SnapshotRef,
        filter: Option<&PackageCoords>,
    ) -> Result<StructureSnapshot> {
        let (package_id, package_version) = reference.package_slots(filter);
        let key: CacheKey = vec![
            reference.normalized_id().into(),
            package_id.into(),
            package_version.into(),
        ];

        if let Some(snapshot) = self.snapshot_cache.get(&key).await? {
            return Ok(snapshot);
        }

        tracing::debug!("fetching snapshot '{reference}'");
        let mut snapshot = self.snapshots.get_snapshot(reference, filter).await?;
        self.enrich_snapshot(&mut snapshot).await?;
        self.snapshot_cache.set(&key, snapshot.clone()).await?;
        Ok(snapshot)
    }

    /// Cache namespace for element keys: the package filter when one is in
    /// force, the navigator's package context otherwise.
    pub(crate) fn element_namespace(&self, filter: Option<&PackageCoords>) -> Result<String> {
        match filter {
            Some(coords) => Ok(serde_json::to_string(&[coords])?),
            None => Ok(self.package_context.clone()),
        }
    }

    /// Resolve `segments` against a snapshot, starting at its root.
    ///
    /// `came_from` carries the element a virtual-slice hop departed from, so
    /// an empty remainder can inherit (and narrow) its FSH names.
    pub(crate) fn resolve_path<'a>(
        &'a self,
        reference: &'a SnapshotRef,
        segments: &'a [String],
        filter: Option<&'a PackageCoords>,
        came_from: Option<&'a ElementDefinition>,
    ) -> ResolveFuture<'a, ElementDefinition> {
        Box::pin(async move {
            let namespace = self.element_namespace(filter)?;
            let normalized = reference.normalized_id();
            let full_key = scoped_key(&namespace, &normalized, &segments.join("."));

            if let Some(element) = self.element_cache.get(&full_key).await? {
                return Ok(element);
            }

            let snapshot = self.fetch_snapshot(reference, filter).await?;
            let Some(root) = snapshot.root() else {
                return Err(NavigatorError::upstream(
                    &format!("snapshot '{normalized}'"),
                    "snapshot has no elements",
                ));
            };

            if segments.is_empty() {
                let element = root_element(root, &snapshot, came_from);
                self.element_cache.set(&full_key, element.clone()).await?;
                return Ok(element);
            }

            let mut current = root.clone();
            let mut current_path = root.id.clone();

            for (index, raw) in segments.iter().enumerate() {
                let prefix = segments[..=index].join(".");
                let prefix_key = scoped_key(&namespace, &normalized, &prefix);
                if let Some(element) = self.element_cache.get(&prefix_key).await? {
                    current_path = element.id.clone();
                    current = element;
                    continue;
                }

                let segment = parse_segment(raw);
                let search_path = format!("{current_path}.{}", segment.base);
                let previous = current.clone();

                match match_element(snapshot.elements(), &search_path) {
                    Some(found) => {
                        let mut resolved = found.element.clone();
                        if let Some(narrowed_type) = found.narrowed {
                            // An explicit slice for the narrowed type wins
                            // over synthesizing one from the choice head.
                            let inferred = resolved.inferred_name(&narrowed_type.code);
                            let explicit_id = format!("{}:{inferred}", resolved.id);
                            if let Some(explicit) = snapshot.element_by_id(&explicit_id) {
                                resolved = explicit.clone();
                            } else {
                                resolved.types = Some(vec![narrowed_type.clone()]);
                                resolved.names = Some(vec![inferred]);
                            }
                        }
                        current = resolved;
                    }
                    None => {
                        if let Some(element) =
                            self.rebase(&previous, &snapshot, &segments[index..]).await?
                        {
                            self.element_cache.set(&full_key, element.clone()).await?;
                            return Ok(element);
                        }
                        return Err(NavigatorError::element_not_found(
                            raw,
                            &previous.path,
                            &normalized,
                        ));
                    }
                }

                if let Some(slice) = &segment.slice {
                    match self.resolve_slice(&current, slice, &snapshot).await? {
                        SliceOutcome::Element(element) => current = element,
                        SliceOutcome::Rebase(hop_reference) => {
                            let rest: Vec<String> = segments[index + 1..].to_vec();
                            let element = self
                                .resolve_path(&hop_reference, &rest, None, Some(&current))
                                .await?;
                            self.element_cache.set(&full_key, element.clone()).await?;
                            return Ok(element);
                        }
                    }
                }

                current_path = current.id.clone();
                self.element_cache.set(&prefix_key, current.clone()).await?;
            }

            Ok(current)
        })
    }
}

/// The root element returned for the empty path: a copy typed as the
/// snapshot itself, with FSH names inherited from the hop origin.
fn root_element(
    root: &ElementDefinition,
    snapshot: &StructureSnapshot,
    came_from: Option<&ElementDefinition>,
) -> ElementDefinition {
    let mut element = root.clone();
    element.types = Some(vec![ElementType {
        code: snapshot.type_name.clone(),
        kind: Some(snapshot.kind.clone()),
        ..Default::default()
    }]);

    if let Some(names) = came_from.and_then(|origin| origin.names.as_ref()) {
        if names.len() > 1 {
            let suffix = initcap(&snapshot.type_name);
            element.names = Some(
                names
                    .iter()
                    .filter(|name| name.ends_with(&suffix))
                    .cloned()
                    .collect(),
            );
        } else {
            element.names = Some(names.clone());
        }
    }

    element
}
