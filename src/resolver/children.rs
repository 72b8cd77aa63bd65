//! Immediate-children resolution: resolve the parent, select its direct
//! children from the owning snapshot, and rebase terminal leaf types.

use url::Url;

use crate::error::NavigatorError;
use crate::navigator::StructureNavigator;
use crate::path::split_fsh_path;
use crate::resolver::{ResolveFuture, scoped_key};
use crate::types::{ElementDefinition, PackageCoords, SnapshotRef};

impl StructureNavigator {
    pub(crate) fn resolve_children<'a>(
        &'a self,
        reference: &'a SnapshotRef,
        fsh_path: &'a str,
        filter: Option<&'a PackageCoords>,
    ) -> ResolveFuture<'a, Vec<ElementDefinition>> {
        Box::pin(async move {
            let normalized = reference.normalized_id();
            let mut key = scoped_key(&self.package_context, &normalized, fsh_path);
            if let Some(children) = self.children_cache.get(&key).await? {
                return Ok(children);
            }

            let segments = split_fsh_path(fsh_path);
            let resolved = self.resolve_path(reference, &segments, filter, None).await?;
            let parent_id = resolved.id.clone();

            // The parent may live in another snapshot (rebase, virtual
            // slice); select children from the definition that supplied it.
            let mut snapshot = self.fetch_snapshot(reference, filter).await?;
            if resolved.from_definition.as_deref() != Some(snapshot.url.as_str()) {
                if let Some(origin) = &resolved.from_definition {
                    let actual = SnapshotRef::from(origin.as_str());
                    key = scoped_key(&self.package_context, &actual.normalized_id(), fsh_path);
                    if let Some(children) = self.children_cache.get(&key).await? {
                        return Ok(children);
                    }
                    snapshot = self.fetch_snapshot(&actual, None).await?;
                }
            }

            let prefix = format!("{parent_id}.");
            let children: Vec<ElementDefinition> = snapshot
                .elements()
                .iter()
                .filter(|e| {
                    e.id.strip_prefix(&prefix)
                        .is_some_and(|suffix| !suffix.contains('.'))
                })
                .cloned()
                .collect();

            if !children.is_empty() {
                self.children_cache.set(&key, children.clone()).await?;
                return Ok(children);
            }

            if let Some(content_reference) = &resolved.content_reference {
                let target = content_reference.trim_start_matches('#');
                let type_prefix = format!("{}.", snapshot.type_name);
                let target = target.strip_prefix(&type_prefix).unwrap_or(target);
                let base = SnapshotRef::from(snapshot.type_name.as_str());
                return self.resolve_children(&base, target, None).await;
            }

            let types = resolved.types.as_deref().unwrap_or_default();
            if types.len() > 1 {
                return Err(NavigatorError::ambiguous_choice(
                    &resolved.path,
                    &normalized,
                    types.len(),
                ));
            }

            if let Some(element_type) = types.first() {
                let children = match element_type.profile.as_deref().and_then(|p| p.first()) {
                    Some(profile) => {
                        let profile_id = canonical_tail(profile);
                        self.resolve_children(&SnapshotRef::from(profile_id.as_str()), ".", None)
                            .await?
                    }
                    None => {
                        self.resolve_children(
                            &SnapshotRef::from(element_type.code.as_str()),
                            ".",
                            Some(&snapshot.core_package),
                        )
                        .await?
                    }
                };
                self.children_cache.set(&key, children.clone()).await?;
                return Ok(children);
            }

            self.children_cache.set(&key, Vec::new()).await?;
            Ok(Vec::new())
        })
    }
}

/// Last path segment of a canonical, ignoring any `|version` suffix.
fn canonical_tail(canonical: &str) -> String {
    let unversioned = canonical.split('|').next().unwrap_or(canonical);
    match Url::parse(unversioned) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|tail| !tail.is_empty())
            .map(|tail| tail.to_string())
            .unwrap_or_else(|| unversioned.to_string()),
        Err(_) => unversioned
            .rsplit('/')
            .next()
            .unwrap_or(unversioned)
            .to_string(),
    }
}
