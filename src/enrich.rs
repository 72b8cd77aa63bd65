//! One-time snapshot enrichment.
//!
//! Runs on every snapshot the first time it is fetched, before it enters the
//! snapshot cache: origin tagging, verbose-field stripping, per-type `__kind`
//! classification through the type-meta cache, and FSH-style `__name`
//! computation. Enriched snapshots are immutable afterwards.

use crate::error::Result;
use crate::navigator::StructureNavigator;
use crate::path::{initcap, last_path_segment};
use crate::provider::MetaQuery;
use crate::storage::CacheKey;
use crate::types::{ElementDefinition, StructureSnapshot};

/// Narrative fields dropped from every element before caching.
const VERBOSE_FIELDS: &[&str] = &[
    "alias",
    "mapping",
    "mustSupport",
    "isSummary",
    "isModifier",
    "requirements",
    "representation",
    "comment",
    "definition",
    "isModifierReason",
    "meaningWhenMissing",
    "example",
    "short",
];

const SYSTEM_TYPE_PREFIX: &str = "http://hl7.org/fhirpath/System.";

impl StructureNavigator {
    pub(crate) async fn enrich_snapshot(&self, snapshot: &mut StructureSnapshot) -> Result<()> {
        let url = snapshot.url.clone();
        let core = snapshot.core_package.clone();
        let package_id = snapshot.package_id.clone();
        let package_version = snapshot.package_version.clone();

        for element in &mut snapshot.snapshot.element {
            element.from_definition = Some(url.clone());
            element.core_package = Some(core.clone());
            element.package_id = package_id.clone();
            element.package_version = package_version.clone();

            for field in VERBOSE_FIELDS {
                element.extra.remove(*field);
            }
            if let Some(constraints) = &mut element.constraint {
                for constraint in constraints {
                    constraint.xpath = None;
                }
            }

            if let Some(types) = &mut element.types {
                for element_type in types {
                    if element_type.code.starts_with(SYSTEM_TYPE_PREFIX) {
                        element_type.kind = Some("system".to_string());
                        continue;
                    }

                    let key: CacheKey = vec![
                        element_type.code.clone().into(),
                        core.id.clone().into(),
                        core.version.clone().into(),
                    ];
                    match self.type_meta_cache.get(&key).await {
                        Ok(Some(meta)) => {
                            if let Some(kind) = meta.kind {
                                element_type.kind = Some(kind);
                            }
                        }
                        Ok(None) => {
                            let query =
                                MetaQuery::structure_definition(&element_type.code, Some(&core));
                            match self.metadata.resolve_meta(&query).await {
                                Ok(Some(meta)) => {
                                    if let Some(kind) = &meta.kind {
                                        element_type.kind = Some(kind.clone());
                                    }
                                    let _ = self.type_meta_cache.set(&key, meta).await;
                                }
                                Ok(None) => {}
                                // Classification is best-effort; a failed
                                // lookup leaves __kind unset.
                                Err(err) => {
                                    tracing::debug!(
                                        "type metadata lookup failed for '{}': {err}",
                                        element_type.code
                                    );
                                }
                            }
                        }
                        Err(err) => {
                            tracing::debug!("type-meta cache read failed: {err}");
                        }
                    }
                }
            }

            element.names = compute_names(element);
        }

        Ok(())
    }
}

/// FSH-style concrete names for one element, ordered like its types.
pub(crate) fn compute_names(element: &ElementDefinition) -> Option<Vec<String>> {
    let last = last_path_segment(&element.path);
    let types = element.types.as_deref().unwrap_or_default();

    if types.len() == 1 {
        if let Some(base) = last.strip_suffix("[x]") {
            return Some(vec![format!("{base}{}", initcap(&types[0].code))]);
        }
        return Some(vec![last.to_string()]);
    }

    if types.len() > 1 {
        if let Some(base) = last.strip_suffix("[x]") {
            return Some(
                types
                    .iter()
                    .map(|t| format!("{base}{}", initcap(&t.code)))
                    .collect(),
            );
        }
    }

    if let Some(reference) = &element.content_reference {
        return Some(vec![last_path_segment(reference).to_string()]);
    }

    None
}
