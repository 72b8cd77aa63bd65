//! Cross-snapshot rebasing: when the current snapshot has no element for the
//! next segment, resolution continues in the snapshot dictated by the
//! previous element's `contentReference`, profile or base type.

use crate::error::Result;
use crate::navigator::StructureNavigator;
use crate::path::split_fsh_path;
use crate::types::{ElementDefinition, SnapshotRef, StructureSnapshot};

impl StructureNavigator {
    /// Re-resolve `rest` (the failed segment and everything after it) in
    /// another snapshot. `Ok(None)` means no rebasing strategy applies.
    pub(crate) async fn rebase(
        &self,
        previous: &ElementDefinition,
        snapshot: &StructureSnapshot,
        rest: &[String],
    ) -> Result<Option<ElementDefinition>> {
        // "My children are those of X": splice the referenced path in front
        // of the remainder and resolve within the base type.
        if let Some(content_reference) = &previous.content_reference {
            let target = content_reference.trim_start_matches('#');
            let type_prefix = format!("{}.", snapshot.type_name);
            let target = target.strip_prefix(&type_prefix).unwrap_or(target);

            let mut segments = split_fsh_path(target);
            segments.extend(rest.iter().cloned());
            tracing::debug!(
                "content reference rebase from '{}' into '{}'",
                previous.id,
                snapshot.type_name
            );

            let reference = SnapshotRef::from(snapshot.type_name.as_str());
            let element = self
                .resolve_path(&reference, &segments, Some(&snapshot.core_package), None)
                .await?;
            return Ok(Some(element));
        }

        let types = previous.types.as_deref().unwrap_or_default();
        let [element_type] = types else {
            return Ok(None);
        };

        if let Some(profile) = element_type.profile.as_deref().and_then(|p| p.first()) {
            tracing::debug!("profile rebase from '{}' into '{profile}'", previous.id);
            let reference = SnapshotRef::from(profile.as_str());
            let filter = snapshot.package();
            let element = self
                .resolve_path(&reference, rest, filter.as_ref(), None)
                .await?;
            return Ok(Some(element));
        }

        tracing::debug!(
            "base type rebase from '{}' into '{}'",
            previous.id,
            element_type.code
        );
        let reference = SnapshotRef::from(element_type.code.as_str());
        let element = self
            .resolve_path(&reference, rest, Some(&snapshot.core_package), None)
            .await?;
        Ok(Some(element))
    }
}
