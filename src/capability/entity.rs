//! Nested entity metadata
//!
//! A column whose value references a row of another entity (an expansion)
//! is checked against that entity's own capability metadata. The provider
//! maps an entity identity to its name mapping and delegation metadata.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::errors::{CapabilityError, CapabilityResult};
use super::metadata::DelegationMetadata;

/// Bidirectional logical ↔ display column name mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct DisplayNameMapping {
    /// logical -> display
    by_logical: BTreeMap<String, String>,
    /// display -> logical
    by_display: BTreeMap<String, String>,
}

impl DisplayNameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pair, rejecting a display name already bound to another column
    pub fn insert(
        &mut self,
        logical: impl Into<String>,
        display: impl Into<String>,
    ) -> CapabilityResult<()> {
        let logical = logical.into();
        let display = display.into();

        if let Some(existing) = self.by_display.get(&display) {
            if existing != &logical {
                return Err(CapabilityError::AmbiguousDisplayName {
                    display,
                    first: existing.clone(),
                    second: logical,
                });
            }
        }

        if let Some(old_display) = self.by_logical.insert(logical.clone(), display.clone()) {
            self.by_display.remove(&old_display);
        }
        self.by_display.insert(display, logical);
        Ok(())
    }

    pub fn logical_for_display(&self, display: &str) -> Option<&str> {
        self.by_display.get(display).map(String::as_str)
    }

    pub fn display_for_logical(&self, logical: &str) -> Option<&str> {
        self.by_logical.get(logical).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_logical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_logical.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for DisplayNameMapping {
    type Error = CapabilityError;

    fn try_from(pairs: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut mapping = Self::new();
        for (logical, display) in pairs {
            mapping.insert(logical, display)?;
        }
        Ok(mapping)
    }
}

impl From<DisplayNameMapping> for BTreeMap<String, String> {
    fn from(mapping: DisplayNameMapping) -> Self {
        mapping.by_logical
    }
}

/// Metadata for one entity reachable through an expansion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(default)]
    pub display_name_mapping: DisplayNameMapping,
    #[serde(default)]
    pub delegation: DelegationMetadata,
}

impl EntityMetadata {
    pub fn new(display_name_mapping: DisplayNameMapping, delegation: DelegationMetadata) -> Self {
        Self {
            display_name_mapping,
            delegation,
        }
    }
}

/// Registry of entity metadata keyed by entity identity.
///
/// Failing to find an entity is a valid, reported outcome.
pub trait EntityMetadataProvider: Send + Sync + fmt::Debug {
    fn try_get_entity_metadata(&self, identity: &str) -> Option<Arc<EntityMetadata>>;
}

/// In-memory entity metadata registry
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: RwLock<HashMap<String, Arc<EntityMetadata>>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity
    pub fn register(
        &self,
        identity: impl Into<String>,
        metadata: EntityMetadata,
    ) -> CapabilityResult<()> {
        let identity = identity.into();
        let mut entities = self
            .entities
            .write()
            .map_err(|_| CapabilityError::Internal("Lock poisoned".into()))?;

        if entities.contains_key(&identity) {
            return Err(CapabilityError::DuplicateEntity(identity));
        }
        entities.insert(identity, Arc::new(metadata));
        Ok(())
    }

    /// Registered identities, sorted
    pub fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entities
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entities.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityMetadataProvider for EntityRegistry {
    fn try_get_entity_metadata(&self, identity: &str) -> Option<Arc<EntityMetadata>> {
        self.entities.read().ok()?.get(identity).cloned()
    }
}
