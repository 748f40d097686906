//! Delegation status taxonomy and telemetry context
//!
//! A status explains why a sub-expression was judged non-delegable. It is
//! reported through diagnostics only and never changes a verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::NodeKind;

/// Why a node could not be delegated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DelegationStatus {
    /// The column does not support the required capability or operator
    NoDelSupportByColumn,
    /// The node is asynchronous and async delegation is disabled
    AsyncPredicate,
    /// The node has side effects and impure delegation is disabled
    ImpureNode,
    /// A row-scoped call to a function the server cannot evaluate
    UndelegatableFunction,
    Other,
}

impl DelegationStatus {
    pub const ALL: [DelegationStatus; 5] = [
        DelegationStatus::NoDelSupportByColumn,
        DelegationStatus::AsyncPredicate,
        DelegationStatus::ImpureNode,
        DelegationStatus::UndelegatableFunction,
        DelegationStatus::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DelegationStatus::NoDelSupportByColumn => "NoDelSupportByColumn",
            DelegationStatus::AsyncPredicate => "AsyncPredicate",
            DelegationStatus::ImpureNode => "ImpureNode",
            DelegationStatus::UndelegatableFunction => "UndelegatableFunction",
            DelegationStatus::Other => "Other",
        }
    }
}

impl fmt::Display for DelegationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telemetry context for a column lacking support
pub fn no_del_support_by_column_context(column: &str) -> String {
    format!("Column:{}", column)
}

/// Telemetry context for a failed async/purity check
pub fn async_or_impure_context(kind: NodeKind, is_async: bool, is_pure: bool) -> String {
    format!("Kind:{}, isAsync:{}, isPure:{}", kind, is_async, is_pure)
}

/// Telemetry context for a structurally undelegatable node
pub fn kind_context(kind: NodeKind, is_row_scoped: bool) -> String {
    format!("Kind:{}, isRowScoped:{}", kind, is_row_scoped)
}

/// Telemetry context for a call the server cannot evaluate
pub fn undelegatable_function_context(function: Option<&str>) -> String {
    format!("Function:{}", function.unwrap_or("<unresolved>"))
}

/// Telemetry context for an expansion whose entity is unknown
pub fn entity_not_found_context(kind: NodeKind, is_row_scoped: bool, identity: &str) -> String {
    format!(
        "Kind:{}, isRowScoped:{}, no metadata found for entity {}",
        kind, is_row_scoped, identity
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        let names: Vec<&str> = DelegationStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            [
                "NoDelSupportByColumn",
                "AsyncPredicate",
                "ImpureNode",
                "UndelegatableFunction",
                "Other"
            ]
        );
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&DelegationStatus::ImpureNode).unwrap();
        assert_eq!(json, "\"ImpureNode\"");
        let back: DelegationStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DelegationStatus::ImpureNode);
    }

    #[test]
    fn test_contexts() {
        assert_eq!(
            async_or_impure_context(NodeKind::Call, true, false),
            "Kind:Call, isAsync:true, isPure:false"
        );
        assert!(entity_not_found_context(NodeKind::DottedName, true, "accounts")
            .ends_with("no metadata found for entity accounts"));
        assert_eq!(undelegatable_function_context(None), "Function:<unresolved>");
    }
}
