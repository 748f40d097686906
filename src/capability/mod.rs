//! Capability model for remote data sources
//!
//! Describes what a remote table (and each entity reachable from it)
//! can evaluate: per-column function capabilities, per-column operators,
//! and the filter/sort facets a function selects between.
//!
//! Everything here is an immutable, pure-lookup view constructed by the
//! schema-import step.

mod capability;
mod entity;
mod errors;
mod metadata;
mod path;

pub use capability::DelegationCapability;
pub use entity::{DisplayNameMapping, EntityMetadata, EntityMetadataProvider, EntityRegistry};
pub use errors::{CapabilityError, CapabilityResult};
pub use metadata::{CapabilityMetadata, ColumnCapabilities, DelegationMetadata};
pub use path::ColumnPath;
