//! Capability metadata
//!
//! Read-only description of which columns and operators a remote source
//! can evaluate. Built once per compilation unit by schema import and never
//! mutated by analysis.
//!
//! Lookups are total: a column without an entry is simply not delegable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::capability::DelegationCapability;
use super::path::ColumnPath;

/// What a single column supports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCapabilities {
    /// Function-level capabilities (filter, sort, ...)
    #[serde(default)]
    pub capabilities: DelegationCapability,
    /// Operators the column may appear under
    #[serde(default)]
    pub operators: DelegationCapability,
}

impl ColumnCapabilities {
    pub fn new(capabilities: DelegationCapability, operators: DelegationCapability) -> Self {
        Self {
            capabilities,
            operators,
        }
    }
}

/// One facet (filter or sort) of a source's capability metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMetadata {
    /// Operators the source evaluates at all
    #[serde(default)]
    pub table_capabilities: DelegationCapability,
    #[serde(default, with = "dotted_keys")]
    columns: BTreeMap<ColumnPath, ColumnCapabilities>,
}

impl CapabilityMetadata {
    pub fn new(table_capabilities: DelegationCapability) -> Self {
        Self {
            table_capabilities,
            columns: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the entry for a column
    pub fn with_column(mut self, path: ColumnPath, column: ColumnCapabilities) -> Self {
        self.columns.insert(path, column);
        self
    }

    pub fn column(&self, path: &ColumnPath) -> Option<&ColumnCapabilities> {
        self.columns.get(path)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnPath, &ColumnCapabilities)> {
        self.columns.iter()
    }

    /// Does the column support the given function capability?
    ///
    /// A capability set matches when any of its bits is supported, so a
    /// `SORT | SORT_ASCENDING_ONLY` requirement accepts either.
    pub fn is_delegation_supported_by_column(
        &self,
        path: &ColumnPath,
        capability: DelegationCapability,
    ) -> bool {
        self.columns
            .get(path)
            .is_some_and(|c| c.capabilities.intersects(capability))
    }

    /// Does the column support the given operator?
    pub fn is_op_supported_by_column(&self, path: &ColumnPath, op: DelegationCapability) -> bool {
        self.columns
            .get(path)
            .is_some_and(|c| c.operators.has_capability(op))
    }

    /// Does the source evaluate the operator at all?
    pub fn is_op_supported_by_table(&self, op: DelegationCapability) -> bool {
        self.table_capabilities.has_capability(op)
    }
}

/// Filter and sort facets derived from the same source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationMetadata {
    #[serde(default)]
    pub filter: CapabilityMetadata,
    #[serde(default)]
    pub sort: CapabilityMetadata,
}

impl DelegationMetadata {
    pub fn new(filter: CapabilityMetadata, sort: CapabilityMetadata) -> Self {
        Self { filter, sort }
    }

    pub fn filter_facet(&self) -> &CapabilityMetadata {
        &self.filter
    }

    pub fn sort_facet(&self) -> &CapabilityMetadata {
        &self.sort
    }

    /// Sort facet when `required` includes sorting, filter facet otherwise
    pub fn select_facet(&self, required: DelegationCapability) -> &CapabilityMetadata {
        if required.requires_sort() {
            &self.sort
        } else {
            &self.filter
        }
    }
}

/// Serializes column maps keyed by dotted path strings
mod dotted_keys {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{ColumnCapabilities, ColumnPath};

    pub fn serialize<S: Serializer>(
        columns: &BTreeMap<ColumnPath, ColumnCapabilities>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let keyed: BTreeMap<String, &ColumnCapabilities> = columns
            .iter()
            .map(|(path, caps)| (path.to_dotted_syntax(), caps))
            .collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<ColumnPath, ColumnCapabilities>, D::Error> {
        let keyed = BTreeMap::<String, ColumnCapabilities>::deserialize(deserializer)?;
        keyed
            .into_iter()
            .map(|(dotted, caps)| {
                ColumnPath::parse(&dotted)
                    .map(|path| (path, caps))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> ColumnPath {
        ColumnPath::parse(s).unwrap()
    }

    fn sample() -> CapabilityMetadata {
        CapabilityMetadata::new(DelegationCapability::EQUAL | DelegationCapability::AND)
            .with_column(
                path("Name"),
                ColumnCapabilities::new(
                    DelegationCapability::FILTER,
                    DelegationCapability::EQUAL | DelegationCapability::STARTS_WITH,
                ),
            )
            .with_column(
                path("Created"),
                ColumnCapabilities::new(DelegationCapability::SORT, DelegationCapability::NONE),
            )
    }

    #[test]
    fn test_missing_column_is_not_delegable() {
        let metadata = sample();
        assert!(!metadata.is_delegation_supported_by_column(&path("Missing"), DelegationCapability::FILTER));
        assert!(!metadata.is_op_supported_by_column(&path("Missing"), DelegationCapability::EQUAL));
    }

    #[test]
    fn test_column_capability_lookup() {
        let metadata = sample();
        assert!(metadata.is_delegation_supported_by_column(&path("Name"), DelegationCapability::FILTER));
        assert!(!metadata.is_delegation_supported_by_column(&path("Name"), DelegationCapability::SORT));
        assert!(metadata.is_delegation_supported_by_column(&path("Created"), DelegationCapability::SORTING));
    }

    #[test]
    fn test_operator_lookup() {
        let metadata = sample();
        assert!(metadata.is_op_supported_by_column(&path("Name"), DelegationCapability::EQUAL));
        assert!(!metadata.is_op_supported_by_column(&path("Name"), DelegationCapability::LESS_THAN));
        assert!(metadata.is_op_supported_by_table(DelegationCapability::AND));
        assert!(!metadata.is_op_supported_by_table(DelegationCapability::OR));
    }

    #[test]
    fn test_select_facet() {
        let filter = sample();
        let sort = CapabilityMetadata::new(DelegationCapability::NONE);
        let metadata = DelegationMetadata::new(filter.clone(), sort.clone());

        assert_eq!(metadata.select_facet(DelegationCapability::FILTER), &filter);
        assert_eq!(metadata.select_facet(DelegationCapability::SORT), &sort);
        assert_eq!(metadata.select_facet(DelegationCapability::SORT_ASCENDING_ONLY), &sort);
    }

    #[test]
    fn test_deserialize_dotted_keys() {
        let metadata: CapabilityMetadata = serde_json::from_value(json!({
            "table_capabilities": ["equal"],
            "columns": {
                "Address.City": { "capabilities": ["filter"], "operators": ["equal"] }
            }
        }))
        .unwrap();

        assert!(metadata.is_delegation_supported_by_column(&path("Address.City"), DelegationCapability::FILTER));
        assert!(metadata.column(&path("Address")).is_none());
    }
}
