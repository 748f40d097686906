//! Resolved types and name information supplied by the binder

use std::fmt;
use std::sync::Arc;

use crate::capability::{ColumnPath, DelegationMetadata, EntityMetadata, EntityMetadataProvider};
use crate::syntax::DName;

/// Reference from a record-typed value into another entity
#[derive(Clone)]
pub struct ExpandInfo {
    /// Identity of the referenced entity
    pub identity: String,
    /// Name of the expanded column on the parent
    pub name: DName,
    /// Registry owned by the parent data source
    pub provider: Arc<dyn EntityMetadataProvider>,
}

impl ExpandInfo {
    pub fn new(
        identity: impl Into<String>,
        name: DName,
        provider: Arc<dyn EntityMetadataProvider>,
    ) -> Self {
        Self {
            identity: identity.into(),
            name,
            provider,
        }
    }

    /// Resolves the referenced entity through the parent's provider
    pub fn entity_metadata(&self) -> Option<Arc<EntityMetadata>> {
        self.provider.try_get_entity_metadata(&self.identity)
    }
}

impl fmt::Debug for ExpandInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpandInfo")
            .field("identity", &self.identity)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolved type of a node, reduced to what delegation needs
#[derive(Debug, Clone)]
pub enum DType {
    OptionSet,
    OptionSetValue,
    View,
    ViewValue,
    Record { expand: Option<ExpandInfo> },
    Other,
}

impl DType {
    pub fn expand_info(&self) -> Option<&ExpandInfo> {
        match self {
            DType::Record { expand } => expand.as_ref(),
            _ => None,
        }
    }

    pub fn has_expand_info(&self) -> bool {
        self.expand_info().is_some()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DType::OptionSet => "OptionSet",
            DType::OptionSetValue => "OptionSetValue",
            DType::View => "View",
            DType::ViewValue => "ViewValue",
            DType::Record { .. } => "Record",
            DType::Other => "Other",
        }
    }
}

/// What a first name resolved to
#[derive(Debug, Clone)]
pub enum NameInfo {
    /// A column of a row scope; `source` is `None` when the scope belongs to
    /// an outer, non-delegable evaluation
    LocalColumn {
        path: ColumnPath,
        source: Option<Arc<DelegationMetadata>>,
    },
    /// The whole row of a scope (`ThisRecord`, an `As` alias)
    ScopeRecord {
        source: Option<Arc<DelegationMetadata>>,
    },
    /// A column that references another entity
    EntityExpansion { name: DName, expand: ExpandInfo },
    Other,
}

impl NameInfo {
    /// Delegation metadata bound to the name, if any.
    ///
    /// `None` means the value is supplied by an outer evaluation rather
    /// than by this delegation.
    pub fn delegation_metadata(&self) -> Option<Arc<DelegationMetadata>> {
        match self {
            NameInfo::LocalColumn { source, .. } | NameInfo::ScopeRecord { source } => {
                source.clone()
            }
            NameInfo::EntityExpansion { expand, .. } => expand
                .entity_metadata()
                .map(|entity| Arc::new(entity.delegation.clone())),
            NameInfo::Other => None,
        }
    }
}
