mod element;
mod snapshot;

pub use element::{ElementConstraint, ElementDefinition, ElementType};
pub use snapshot::{PackageCoords, SnapshotElements, SnapshotRef, StructureSnapshot};
