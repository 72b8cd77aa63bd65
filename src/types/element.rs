use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::PackageCoords;

/// One node of a StructureDefinition snapshot.
///
/// Only the fields the resolver reasons about are modeled explicitly; all
/// remaining metadata (`fixedUri`, `binding`, `short`, ...) rides in the
/// flattened `extra` map and survives round-trips untouched, except for the
/// verbose fields the enricher strips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementDefinition {
    pub id: String,
    pub path: String,

    #[serde(rename = "sliceName", skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementType>>,

    #[serde(rename = "contentReference", skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Vec<ElementConstraint>>,

    // Enrichment fields, absent until the snapshot passes through the enricher.
    #[serde(rename = "__fromDefinition", skip_serializing_if = "Option::is_none")]
    pub from_definition: Option<String>,

    #[serde(rename = "__corePackage", skip_serializing_if = "Option::is_none")]
    pub core_package: Option<PackageCoords>,

    #[serde(rename = "__packageId", skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,

    #[serde(rename = "__packageVersion", skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,

    /// FSH-style concrete names, ordered. A narrowed choice element carries
    /// exactly one, an unnarrowed `[x]` head one per allowed type.
    #[serde(rename = "__name", skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementType {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    #[serde(rename = "targetProfile", skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,

    #[serde(rename = "__kind", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub human: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ElementDefinition {
    /// Choice elements carry an id ending in `[x]`.
    pub fn is_choice(&self) -> bool {
        self.id.ends_with("[x]")
    }

    /// Last dot-segment of the id with a trailing `[x]` removed, e.g.
    /// `Extension.value[x]` yields `value`.
    pub fn base_choice_name(&self) -> &str {
        let last = self.id.rsplit('.').next().unwrap_or(&self.id);
        last.strip_suffix("[x]").unwrap_or(last)
    }

    /// FSH-style concrete name for a narrowed choice type, e.g. `value` +
    /// `string` yields `valueString`.
    pub fn inferred_name(&self, code: &str) -> String {
        format!("{}{}", self.base_choice_name(), crate::path::initcap(code))
    }

    /// Codes allowed for this element, in declaration order.
    pub fn type_codes(&self) -> Vec<String> {
        self.types
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|t| t.code.clone())
            .collect()
    }
}

impl ElementType {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Default::default()
        }
    }
}
