//! Operator delegation strategies
//!
//! When an operator wraps a column reference, the column must also support
//! that operator. Each strategy answers this for one operator family.

use crate::binding::Binding;
use crate::capability::{CapabilityMetadata, ColumnPath, DelegationCapability};
use crate::syntax::{BinaryOp, Expr, UnaryOp};

/// Operator-specific column check
pub trait OpDelegationStrategy {
    /// Operator name used in hints
    fn operator(&self) -> &str;

    /// Capability the column must expose
    fn required_capability(&self) -> DelegationCapability;

    fn is_op_supported_by_column(
        &self,
        metadata: &CapabilityMetadata,
        _node: &Expr,
        column: &ColumnPath,
        _binding: &dyn Binding,
    ) -> bool {
        metadata.is_op_supported_by_column(column, self.required_capability())
    }
}

/// Comparison and arithmetic operators
#[derive(Debug, Clone, Copy)]
pub struct BinaryOpDelegationStrategy {
    op: BinaryOp,
}

impl BinaryOpDelegationStrategy {
    pub fn new(op: BinaryOp) -> Self {
        Self { op }
    }
}

impl OpDelegationStrategy for BinaryOpDelegationStrategy {
    fn operator(&self) -> &str {
        self.op.as_str()
    }

    fn required_capability(&self) -> DelegationCapability {
        self.op.capability()
    }
}

/// `in` / `exactin`.
///
/// A column on the left is a membership test against a list; a column on
/// the right is a substring test against the column's text.
#[derive(Debug, Clone, Copy)]
pub struct InOpDelegationStrategy {
    op: BinaryOp,
    column_on_left: bool,
}

impl InOpDelegationStrategy {
    pub fn new(op: BinaryOp, column_on_left: bool) -> Self {
        assert!(op.is_membership(), "{} is not a membership operator", op.as_str());
        Self { op, column_on_left }
    }
}

impl OpDelegationStrategy for InOpDelegationStrategy {
    fn operator(&self) -> &str {
        self.op.as_str()
    }

    fn required_capability(&self) -> DelegationCapability {
        if self.column_on_left {
            self.op.capability()
        } else {
            DelegationCapability::CONTAINS
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnaryOpDelegationStrategy {
    op: UnaryOp,
}

impl UnaryOpDelegationStrategy {
    pub fn new(op: UnaryOp) -> Self {
        Self { op }
    }
}

impl OpDelegationStrategy for UnaryOpDelegationStrategy {
    fn operator(&self) -> &str {
        self.op.as_str()
    }

    fn required_capability(&self) -> DelegationCapability {
        self.op.capability()
    }
}

/// `StartsWith` / `EndsWith` applied to a column
#[derive(Debug, Clone, Copy)]
pub struct StringMatchDelegationStrategy {
    capability: DelegationCapability,
}

impl StringMatchDelegationStrategy {
    pub fn new(capability: DelegationCapability) -> Self {
        Self { capability }
    }
}

impl OpDelegationStrategy for StringMatchDelegationStrategy {
    fn operator(&self) -> &str {
        if self.capability == DelegationCapability::ENDS_WITH {
            "EndsWith"
        } else {
            "StartsWith"
        }
    }

    fn required_capability(&self) -> DelegationCapability {
        self.capability
    }
}
