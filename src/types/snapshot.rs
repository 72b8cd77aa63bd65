use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::ElementDefinition;

/// Package coordinates. Doubles as the package filter handed to the
/// snapshot provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCoords {
    pub id: String,
    pub version: String,
}

impl PackageCoords {
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
        }
    }
}

/// A fully-resolved StructureDefinition snapshot as produced by the snapshot
/// provider. The first element of `snapshot.element` is the root; its id
/// equals the base type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSnapshot {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub type_name: String,

    /// `primitive-type`, `complex-type`, `resource` or `logical`.
    pub kind: String,

    #[serde(rename = "__corePackage")]
    pub core_package: PackageCoords,

    #[serde(rename = "__packageId", skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,

    #[serde(rename = "__packageVersion", skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,

    pub snapshot: SnapshotElements,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SnapshotElements {
    pub element: Vec<ElementDefinition>,
}

impl StructureSnapshot {
    pub fn elements(&self) -> &[ElementDefinition] {
        &self.snapshot.element
    }

    pub fn root(&self) -> Option<&ElementDefinition> {
        self.snapshot.element.first()
    }

    pub fn element_by_id(&self, id: &str) -> Option<&ElementDefinition> {
        self.snapshot.element.iter().find(|e| e.id == id)
    }

    /// The package this snapshot was loaded from, when the provider recorded
    /// one.
    pub fn package(&self) -> Option<PackageCoords> {
        match (&self.package_id, &self.package_version) {
            (Some(id), Some(version)) => Some(PackageCoords::new(id, version)),
            _ => None,
        }
    }
}

/// How a caller names a snapshot: a plain id / canonical URL, or a fully
/// package-qualified file entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotRef {
    Id(String),
    Entry {
        #[serde(rename = "__packageId")]
        package_id: String,
        #[serde(rename = "__packageVersion")]
        package_version: String,
        filename: String,
    },
}

impl SnapshotRef {
    /// Single normalization used across every cache keyed by snapshot
    /// identity.
    pub fn normalized_id(&self) -> String {
        match self {
            SnapshotRef::Id(id) => id.clone(),
            SnapshotRef::Entry {
                package_id,
                package_version,
                filename,
            } => format!("{package_id}::{package_version}::{filename}"),
        }
    }

    /// Package slots for the snapshot-cache key. Entry references are fully
    /// qualified already, so their slots stay empty.
    pub fn package_slots(&self, filter: Option<&PackageCoords>) -> (String, String) {
        match self {
            SnapshotRef::Entry { .. } => (String::new(), String::new()),
            SnapshotRef::Id(_) => match filter {
                Some(p) => (p.id.clone(), p.version.clone()),
                None => (String::new(), String::new()),
            },
        }
    }
}

impl From<&str> for SnapshotRef {
    fn from(id: &str) -> Self {
        SnapshotRef::Id(id.to_string())
    }
}

impl From<String> for SnapshotRef {
    fn from(id: String) -> Self {
        SnapshotRef::Id(id)
    }
}

impl std::fmt::Display for SnapshotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized_id())
    }
}
