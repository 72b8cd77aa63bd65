#![allow(dead_code)]

//! In-memory snapshot provider and metadata resolver over a small R4 /
//! US-Core fixture set, shared by the integration tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use octofhir_fhirnav::prelude::*;

pub const CORE_PKG: (&str, &str) = ("hl7.fhir.r4.core", "4.0.1");
pub const US_CORE_PKG: (&str, &str) = ("hl7.fhir.us.core", "6.1.0");

// =============================================================================
// Snapshot provider
// =============================================================================

/// Serves fixture snapshots by id, canonical URL or package-qualified entry,
/// counting upstream fetches so tests can assert cache warmth.
pub struct FixtureProvider {
    by_key: HashMap<String, StructureSnapshot>,
    pub fetches: AtomicUsize,
}

impl FixtureProvider {
    pub fn new(snapshots: Vec<StructureSnapshot>) -> Self {
        let mut by_key = HashMap::new();
        for snapshot in snapshots {
            let tail = snapshot
                .url
                .rsplit('/')
                .next()
                .unwrap_or(&snapshot.url)
                .to_string();
            by_key.insert(snapshot.url.clone(), snapshot.clone());
            if let (Some(package_id), Some(package_version)) =
                (&snapshot.package_id, &snapshot.package_version)
            {
                by_key.insert(
                    format!("{package_id}::{package_version}::StructureDefinition-{tail}.json"),
                    snapshot.clone(),
                );
            }
            by_key.insert(tail, snapshot);
        }
        Self {
            by_key,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotProvider for FixtureProvider {
    async fn get_snapshot(
        &self,
        reference: &SnapshotRef,
        filter: Option<&PackageCoords>,
    ) -> octofhir_fhirnav::Result<StructureSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let key = reference.normalized_id();
        let snapshot = self
            .by_key
            .get(&key)
            .ok_or_else(|| NavigatorError::upstream(&key, "no such StructureDefinition"))?;

        if let (SnapshotRef::Id(_), Some(wanted)) = (reference, filter) {
            let actual = snapshot.package();
            if actual.as_ref() != Some(wanted) {
                return Err(NavigatorError::upstream(
                    &key,
                    format!("not found in package {}@{}", wanted.id, wanted.version),
                ));
            }
        }

        Ok(snapshot.clone())
    }
}

// =============================================================================
// Metadata resolver
// =============================================================================

pub struct FixtureResolver {
    metas: Vec<(String, ResourceMeta)>,
    roots: Vec<PackageCoords>,
}

impl FixtureResolver {
    pub fn new(roots: Vec<PackageCoords>) -> Self {
        Self {
            metas: default_metas(),
            roots,
        }
    }

    fn matching(&self, query: &MetaQuery) -> Vec<ResourceMeta> {
        self.metas
            .iter()
            .filter(|(id, meta)| {
                *id == query.id
                    && query.package.as_ref().is_none_or(|p| {
                        meta.package_id == p.id && meta.package_version == p.version
                    })
            })
            .map(|(_, meta)| meta.clone())
            .collect()
    }
}

#[async_trait]
impl MetadataResolver for FixtureResolver {
    async fn resolve_meta(
        &self,
        query: &MetaQuery,
    ) -> octofhir_fhirnav::Result<Option<ResourceMeta>> {
        let matches = self.matching(query);
        Ok(match matches.len() {
            1 => matches.into_iter().next(),
            _ => None,
        })
    }

    async fn lookup(&self, query: &MetaQuery) -> octofhir_fhirnav::Result<Vec<ResourceMeta>> {
        Ok(self.matching(query))
    }

    async fn normalized_root_packages(&self) -> octofhir_fhirnav::Result<Vec<PackageCoords>> {
        Ok(self.roots.clone())
    }
}

// =============================================================================
// Fixture construction
// =============================================================================

fn snapshot(
    url: &str,
    type_name: &str,
    kind: &str,
    pkg: (&str, &str),
    elements: Value,
) -> StructureSnapshot {
    serde_json::from_value(json!({
        "url": url,
        "type": type_name,
        "kind": kind,
        "__corePackage": {"id": CORE_PKG.0, "version": CORE_PKG.1},
        "__packageId": pkg.0,
        "__packageVersion": pkg.1,
        "snapshot": {"element": elements}
    }))
    .expect("fixture snapshot must deserialize")
}

fn meta(id: &str, kind: &str, pkg: (&str, &str)) -> (String, ResourceMeta) {
    (
        id.to_string(),
        serde_json::from_value(json!({
            "kind": kind,
            "__packageId": pkg.0,
            "__packageVersion": pkg.1,
            "filename": format!("StructureDefinition-{id}.json"),
        }))
        .expect("fixture meta must deserialize"),
    )
}

fn default_metas() -> Vec<(String, ResourceMeta)> {
    let mut metas = Vec::new();
    for id in ["Patient", "Bundle", "Observation", "Resource"] {
        metas.push(meta(id, "resource", CORE_PKG));
    }
    for id in [
        "Extension",
        "Identifier",
        "HumanName",
        "CodeableConcept",
        "Quantity",
        "SimpleQuantity",
        "BackboneElement",
    ] {
        metas.push(meta(id, "complex-type", CORE_PKG));
    }
    for id in [
        "string", "code", "uri", "boolean", "dateTime", "decimal", "canonical",
    ] {
        metas.push(meta(id, "primitive-type", CORE_PKG));
    }
    metas.push(meta("us-core-patient", "resource", US_CORE_PKG));
    metas.push(meta("us-core-race", "complex-type", US_CORE_PKG));
    metas
}

pub fn patient() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/Patient",
        "Patient",
        "resource",
        CORE_PKG,
        json!([
            {"id": "Patient", "path": "Patient",
             "short": "Information about an individual receiving care",
             "constraint": [{"key": "dom-2", "severity": "error",
                             "human": "If the resource is contained in another resource, it SHALL NOT contain nested Resources",
                             "expression": "contained.contained.empty()",
                             "xpath": "not(parent::f:contained and f:contained)"}]},
            {"id": "Patient.id", "path": "Patient.id",
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}]},
            {"id": "Patient.extension", "path": "Patient.extension", "max": "*",
             "type": [{"code": "Extension"}]},
            {"id": "Patient.gender", "path": "Patient.gender",
             "short": "male | female | other | unknown",
             "type": [{"code": "code"}]},
            {"id": "Patient.identifier", "path": "Patient.identifier", "max": "*",
             "type": [{"code": "Identifier"}], "isSummary": true,
             "requirements": "Patients are almost always assigned specific numerical identifiers",
             "mapping": [{"identity": "v2", "map": "PID-3"}]},
            {"id": "Patient.name", "path": "Patient.name", "max": "*",
             "type": [{"code": "HumanName"}], "alias": ["legal name"],
             "comment": "A patient may have multiple names with different uses"},
            {"id": "Patient.deceased[x]", "path": "Patient.deceased[x]",
             "type": [{"code": "boolean"}, {"code": "dateTime"}],
             "isModifier": true,
             "isModifierReason": "Once a patient is marked as deceased, the actual or relative time of death is relevant",
             "meaningWhenMissing": "Absence of the element implies the patient is alive"},
        ]),
    )
}

pub fn us_core_patient() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/us/core/StructureDefinition/us-core-patient",
        "Patient",
        "resource",
        US_CORE_PKG,
        json!([
            {"id": "Patient", "path": "Patient",
             "short": "Information about an individual receiving care"},
            {"id": "Patient.extension", "path": "Patient.extension", "max": "*",
             "type": [{"code": "Extension"}]},
            {"id": "Patient.extension:race", "path": "Patient.extension",
             "sliceName": "race", "max": "1",
             "type": [{"code": "Extension",
                       "profile": ["http://hl7.org/fhir/us/core/StructureDefinition/us-core-race"]}],
             "mustSupport": true},
            {"id": "Patient.gender", "path": "Patient.gender", "min": 1,
             "type": [{"code": "code"}], "mustSupport": true,
             "definition": "Administrative Gender"},
            {"id": "Patient.identifier", "path": "Patient.identifier", "max": "*",
             "type": [{"code": "Identifier"}], "mustSupport": true},
            {"id": "Patient.identifier.value", "path": "Patient.identifier.value",
             "short": "The value that is unique within the system",
             "example": [{"label": "General", "valueString": "1032702"}],
             "type": [{"code": "string"}]},
            {"id": "Patient.name", "path": "Patient.name", "max": "*",
             "type": [{"code": "HumanName"}]},
        ]),
    )
}

pub fn extension() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/Extension",
        "Extension",
        "complex-type",
        CORE_PKG,
        json!([
            {"id": "Extension", "path": "Extension"},
            {"id": "Extension.id", "path": "Extension.id",
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}]},
            {"id": "Extension.url", "path": "Extension.url",
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}],
             "representation": ["xmlAttr"]},
            {"id": "Extension.value[x]", "path": "Extension.value[x]",
             "type": [{"code": "string"}, {"code": "CodeableConcept"}, {"code": "Quantity"}]},
        ]),
    )
}

pub fn string_type() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/string",
        "string",
        "primitive-type",
        CORE_PKG,
        json!([
            {"id": "string", "path": "string"},
            {"id": "string.id", "path": "string.id",
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}]},
            {"id": "string.extension", "path": "string.extension", "max": "*",
             "type": [{"code": "Extension"}]},
            {"id": "string.value", "path": "string.value",
             "representation": ["xmlAttr"],
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}]},
        ]),
    )
}

pub fn canonical_type() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/canonical",
        "canonical",
        "primitive-type",
        CORE_PKG,
        json!([
            {"id": "canonical", "path": "canonical"},
            {"id": "canonical.value", "path": "canonical.value",
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}]},
        ]),
    )
}

pub fn identifier() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/Identifier",
        "Identifier",
        "complex-type",
        CORE_PKG,
        json!([
            {"id": "Identifier", "path": "Identifier"},
            {"id": "Identifier.use", "path": "Identifier.use",
             "type": [{"code": "code"}]},
            {"id": "Identifier.system", "path": "Identifier.system",
             "type": [{"code": "uri"}]},
            {"id": "Identifier.value", "path": "Identifier.value",
             "type": [{"code": "string"}]},
        ]),
    )
}

pub fn bundle() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/Bundle",
        "Bundle",
        "resource",
        CORE_PKG,
        json!([
            {"id": "Bundle", "path": "Bundle"},
            {"id": "Bundle.type", "path": "Bundle.type",
             "type": [{"code": "code"}]},
            {"id": "Bundle.link", "path": "Bundle.link", "max": "*",
             "type": [{"code": "BackboneElement"}]},
            {"id": "Bundle.link.relation", "path": "Bundle.link.relation",
             "type": [{"code": "string"}]},
            {"id": "Bundle.link.url", "path": "Bundle.link.url",
             "type": [{"code": "uri"}]},
            {"id": "Bundle.entry", "path": "Bundle.entry", "max": "*",
             "type": [{"code": "BackboneElement"}]},
            {"id": "Bundle.entry.link", "path": "Bundle.entry.link", "max": "*",
             "contentReference": "#Bundle.link"},
            {"id": "Bundle.entry.resource", "path": "Bundle.entry.resource",
             "type": [{"code": "Resource"}]},
        ]),
    )
}

pub fn observation() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/Observation",
        "Observation",
        "resource",
        CORE_PKG,
        json!([
            {"id": "Observation", "path": "Observation"},
            {"id": "Observation.status", "path": "Observation.status", "min": 1,
             "type": [{"code": "code"}]},
            {"id": "Observation.value[x]", "path": "Observation.value[x]",
             "type": [{"code": "Quantity"}, {"code": "CodeableConcept"}, {"code": "string"}]},
        ]),
    )
}

pub fn us_core_race() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race",
        "Extension",
        "complex-type",
        US_CORE_PKG,
        json!([
            {"id": "Extension", "path": "Extension",
             "short": "US Core Race Extension"},
            {"id": "Extension.extension", "path": "Extension.extension", "max": "*",
             "type": [{"code": "Extension"}]},
            {"id": "Extension.extension:ombCategory", "path": "Extension.extension",
             "sliceName": "ombCategory", "max": "5",
             "type": [{"code": "Extension"}]},
            {"id": "Extension.url", "path": "Extension.url",
             "fixedUri": "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race",
             "type": [{"code": "http://hl7.org/fhirpath/System.String"}]},
            {"id": "Extension.value[x]", "path": "Extension.value[x]", "max": "0"},
        ]),
    )
}

pub fn simple_quantity() -> StructureSnapshot {
    snapshot(
        "http://hl7.org/fhir/StructureDefinition/SimpleQuantity",
        "Quantity",
        "complex-type",
        CORE_PKG,
        json!([
            {"id": "Quantity", "path": "Quantity"},
            {"id": "Quantity.value", "path": "Quantity.value",
             "type": [{"code": "decimal"}]},
            {"id": "Quantity.unit", "path": "Quantity.unit",
             "type": [{"code": "string"}]},
            {"id": "Quantity.system", "path": "Quantity.system",
             "type": [{"code": "uri"}]},
            {"id": "Quantity.code", "path": "Quantity.code",
             "type": [{"code": "code"}]},
        ]),
    )
}

pub fn default_snapshots() -> Vec<StructureSnapshot> {
    vec![
        patient(),
        us_core_patient(),
        extension(),
        string_type(),
        canonical_type(),
        identifier(),
        bundle(),
        observation(),
        us_core_race(),
        simple_quantity(),
    ]
}

pub fn default_roots() -> Vec<PackageCoords> {
    vec![
        PackageCoords::new(CORE_PKG.0, CORE_PKG.1),
        PackageCoords::new(US_CORE_PKG.0, US_CORE_PKG.1),
    ]
}

// =============================================================================
// Navigator construction
// =============================================================================

pub async fn build_navigator() -> (StructureNavigator, Arc<FixtureProvider>) {
    build_navigator_with(NavigatorOptions::default()).await
}

pub async fn build_navigator_with(
    options: NavigatorOptions,
) -> (StructureNavigator, Arc<FixtureProvider>) {
    let provider = Arc::new(FixtureProvider::new(default_snapshots()));
    let resolver = Arc::new(FixtureResolver::new(default_roots()));
    let navigator = StructureNavigator::with_options(provider.clone(), resolver, options)
        .await
        .expect("navigator construction");
    (navigator, provider)
}
