//! # Built-in Function Descriptions

use crate::capability::{CapabilityMetadata, DelegationCapability};
use crate::delegation::{DelegationStatus, Hint, StringMatchDelegationStrategy, ValidationPass, Verdict};
use crate::syntax::{CallNode, NodeKind};

use super::function::DelegableFunction;

/// Table function taking a per-row predicate or ordering lambda
#[derive(Debug, Clone)]
pub struct TableFunction {
    name: &'static str,
    capability: DelegationCapability,
}

impl TableFunction {
    pub fn new(name: &'static str, capability: DelegationCapability) -> Self {
        Self { name, capability }
    }

    pub fn filter() -> Self {
        Self::new("Filter", DelegationCapability::FILTER)
    }

    pub fn lookup() -> Self {
        Self::new("LookUp", DelegationCapability::FILTER)
    }

    pub fn sort() -> Self {
        Self::new("Sort", DelegationCapability::SORT)
    }

    pub fn sort_by_columns() -> Self {
        Self::new("SortByColumns", DelegationCapability::SORT)
    }
}

impl DelegableFunction for TableFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn delegation_capability(&self) -> DelegationCapability {
        self.capability
    }
}

/// `StartsWith(column, prefix)` / `EndsWith(column, suffix)`
#[derive(Debug, Clone)]
pub struct StringMatchFunction {
    name: &'static str,
    capability: DelegationCapability,
}

impl StringMatchFunction {
    pub fn starts_with() -> Self {
        Self {
            name: "StartsWith",
            capability: DelegationCapability::STARTS_WITH,
        }
    }

    pub fn ends_with() -> Self {
        Self {
            name: "EndsWith",
            capability: DelegationCapability::ENDS_WITH,
        }
    }
}

impl DelegableFunction for StringMatchFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn delegation_capability(&self) -> DelegationCapability {
        self.capability
    }

    /// Server-side when the first argument is a column supporting the match
    /// and the pattern does not depend on the row.
    fn is_row_scoped_server_delegatable(
        &self,
        call: &CallNode,
        cx: &ValidationPass<'_>,
        metadata: &CapabilityMetadata,
    ) -> bool {
        let [column, pattern] = call.args.as_slice() else {
            return false;
        };
        if !metadata.is_op_supported_by_table(self.capability) {
            return false;
        }

        let strategy = StringMatchDelegationStrategy::new(self.capability);
        cx.validate_node(column, metadata, Some(&strategy)).is_valid()
            && !cx.binding().is_row_scope(pattern.id())
            && cx.validate_node(pattern, metadata, None).is_valid()
    }
}

/// `User()`: evaluated once before the query is sent
#[derive(Debug, Clone, Default)]
pub struct UserFunction;

impl DelegableFunction for UserFunction {
    fn name(&self) -> &str {
        "User"
    }

    fn validate_call_node(
        &self,
        _cx: &ValidationPass<'_>,
        _call: &CallNode,
        _metadata: &CapabilityMetadata,
    ) -> Verdict {
        Verdict::delegable()
    }
}

/// `AsType(record, table)`: a polymorphic lookup cast
#[derive(Debug, Clone, Default)]
pub struct AsTypeFunction;

impl DelegableFunction for AsTypeFunction {
    fn name(&self) -> &str {
        "AsType"
    }

    fn delegation_capability(&self) -> DelegationCapability {
        DelegationCapability::AS_TYPE
    }

    fn validate_call_node(
        &self,
        cx: &ValidationPass<'_>,
        call: &CallNode,
        metadata: &CapabilityMetadata,
    ) -> Verdict {
        if !metadata.is_op_supported_by_table(DelegationCapability::AS_TYPE) {
            return cx.reject(
                call.id,
                NodeKind::Call,
                DelegationStatus::Other,
                Hint::op_not_supported_by_service(self.name()),
                format!("Function:{}, table does not support AsType", self.name()),
            );
        }

        match call.args.first() {
            Some(source) => cx.validate_node(source, metadata, None),
            None => cx.reject(
                call.id,
                NodeKind::Call,
                DelegationStatus::Other,
                Hint::suggest_remote_execution(cx.function().name()),
                format!("Function:{}, missing argument", self.name()),
            ),
        }
    }
}

/// Scalar function with no server-side equivalent, e.g. `Len`
#[derive(Debug, Clone)]
pub struct ScalarFunction {
    name: String,
}

impl ScalarFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DelegableFunction for ScalarFunction {
    fn name(&self) -> &str {
        &self.name
    }
}
