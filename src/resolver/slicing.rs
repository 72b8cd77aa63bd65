//! Bracket-token resolution: real slices, choice-type narrowing, and
//! virtual slices that hop into a standalone profile snapshot.

use crate::error::{NavigatorError, Result};
use crate::navigator::StructureNavigator;
use crate::provider::MetaQuery;
use crate::types::{ElementDefinition, SnapshotRef, StructureSnapshot};

/// Outcome of resolving a bracket token against a base element.
pub(crate) enum SliceOutcome {
    /// Resolution stays within the current snapshot.
    Element(ElementDefinition),
    /// The token named a compatible StructureDefinition; traversal continues
    /// at the root of that snapshot.
    Rebase(SnapshotRef),
}

impl StructureNavigator {
    pub(crate) async fn resolve_slice(
        &self,
        base: &ElementDefinition,
        slice: &str,
        snapshot: &StructureSnapshot,
    ) -> Result<SliceOutcome> {
        // Real slice declared in this snapshot.
        let slice_id = format!("{}:{slice}", base.id);
        if let Some(element) = snapshot.element_by_id(&slice_id) {
            return Ok(SliceOutcome::Element(element.clone()));
        }

        if base.is_choice() {
            // `value[x]` addresses the choice head itself.
            if slice == "x" {
                return Ok(SliceOutcome::Element(base.clone()));
            }

            // `value[string]` narrows the head to one allowed type, unless an
            // explicit slice for that type exists.
            if let Some(element_type) = base
                .types
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|t| t.code == slice)
            {
                let inferred = base.inferred_name(&element_type.code);
                let explicit_id = format!("{}:{inferred}", base.id);
                if let Some(element) = snapshot.element_by_id(&explicit_id) {
                    return Ok(SliceOutcome::Element(element.clone()));
                }

                let mut narrowed = base.clone();
                narrowed.types = Some(vec![element_type.clone()]);
                narrowed.names = Some(vec![inferred]);
                return Ok(SliceOutcome::Element(narrowed));
            }
        }

        // Virtual slice: the token may name a StructureDefinition whose base
        // type is allowed under this element.
        let allowed = base.type_codes();
        if let Some(reference) = self
            .try_resolve_snapshot(slice, &allowed, snapshot, &base.path)
            .await?
        {
            tracing::debug!("virtual slice hop from '{}' into '{reference}'", base.id);
            return Ok(SliceOutcome::Rebase(reference));
        }

        Err(NavigatorError::element_not_found(
            &format!("[{slice}]"),
            &base.path,
            &snapshot.url,
        ))
    }

    /// Resolve an id or canonical URL to a type-compatible snapshot.
    ///
    /// Prefers a singleton metadata match in the core package, then a
    /// generic unfiltered fetch. Underlying lookup errors read as absence;
    /// a resolved but incompatible StructureDefinition is a slice mismatch.
    async fn try_resolve_snapshot(
        &self,
        id: &str,
        allowed: &[String],
        origin: &StructureSnapshot,
        parent_path: &str,
    ) -> Result<Option<SnapshotRef>> {
        let query = MetaQuery::structure_definition(id, Some(&origin.core_package));
        match self.metadata.lookup(&query).await {
            Ok(records) if records.len() == 1 => {
                let reference = records[0].snapshot_ref();
                match self.fetch_snapshot(&reference, None).await {
                    Ok(snapshot) => {
                        if allowed.iter().any(|code| *code == snapshot.type_name) {
                            return Ok(Some(reference));
                        }
                        return Err(NavigatorError::slice_mismatch(
                            id,
                            parent_path,
                            &origin.url,
                            &snapshot.type_name,
                            allowed,
                        ));
                    }
                    Err(err) => {
                        tracing::debug!("core-package snapshot fetch failed for '{id}': {err}");
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!("metadata lookup failed for '{id}': {err}");
            }
        }

        let reference = SnapshotRef::from(id);
        match self.fetch_snapshot(&reference, None).await {
            Ok(snapshot) => {
                if allowed.iter().any(|code| *code == snapshot.type_name) {
                    Ok(Some(reference))
                } else {
                    Err(NavigatorError::slice_mismatch(
                        id,
                        parent_path,
                        &origin.url,
                        &snapshot.type_name,
                        allowed,
                    ))
                }
            }
            Err(_) => Ok(None),
        }
    }
}
