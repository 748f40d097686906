//! Delegation report
//!
//! Deterministic, human-readable account of one validation pass.

use std::fmt;

use serde::Serialize;

use super::status::DelegationStatus;
use super::validator::{Rejection, Verdict};
use crate::capability::DelegationCapability;
use crate::syntax::{Expr, NodeId};

/// Outcome of validating one expression
#[derive(Debug, Clone, Serialize)]
pub struct DelegationReport {
    /// Enclosing function
    pub function: String,
    /// Capability the function requires
    pub capability: DelegationCapability,
    /// Validated node
    pub root: NodeId,
    /// Validated expression, rendered
    pub expression: String,
    pub delegable: bool,
    /// Status of the rejection that decided the verdict
    pub status: Option<DelegationStatus>,
    /// Every rejection emitted during the pass, in emission order
    pub rejections: Vec<Rejection>,
}

impl DelegationReport {
    pub fn new(
        function: &str,
        capability: DelegationCapability,
        root: &Expr,
        verdict: Verdict,
        rejections: Vec<Rejection>,
    ) -> Self {
        Self {
            function: function.to_string(),
            capability,
            root: root.id(),
            expression: root.to_string(),
            delegable: verdict.valid,
            status: verdict.status(),
            rejections,
        }
    }
}

impl fmt::Display for DelegationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== DELEGATION REPORT ===")?;
        writeln!(f, "Function: {} (requires {})", self.function, self.capability)?;
        writeln!(f, "Expression: {} [{}]", self.expression, self.root)?;

        if self.delegable {
            writeln!(f, "Status: DELEGABLE")?;
        } else {
            writeln!(f, "Status: NOT DELEGABLE")?;
            if let Some(status) = &self.status {
                writeln!(f, "Reason: {}", status)?;
            }
        }

        if !self.rejections.is_empty() {
            writeln!(f, "Rejections:")?;
            for rejection in &self.rejections {
                writeln!(
                    f,
                    "  - {} {} {}: {}",
                    rejection.node, rejection.node_kind, rejection.status, rejection.message
                )?;
                writeln!(f, "    context: {}", rejection.context)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::Hint;
    use crate::syntax::{ExprBuilder, NodeKind};

    fn rejection(node: NodeId) -> Rejection {
        let hint = Hint::op_not_supported_by_column("Secret");
        Rejection {
            status: DelegationStatus::NoDelSupportByColumn,
            node,
            node_kind: NodeKind::FirstName,
            key: hint.key,
            message: hint.message,
            context: "Column:Secret".into(),
        }
    }

    #[test]
    fn test_delegable_report() {
        let expr = ExprBuilder::new().first_name("Name");
        let report = DelegationReport::new(
            "Filter",
            DelegationCapability::FILTER,
            &expr,
            Verdict::delegable(),
            Vec::new(),
        );

        let output = report.to_string();
        assert!(output.contains("Status: DELEGABLE"));
        assert!(output.contains("requires filter"));
        assert!(!output.contains("Rejections"));
    }

    #[test]
    fn test_rejected_report() {
        let expr = ExprBuilder::new().first_name("Secret");
        let reason = rejection(expr.id());
        let report = DelegationReport::new(
            "Filter",
            DelegationCapability::FILTER,
            &expr,
            Verdict::rejected(reason.clone()),
            vec![reason],
        );

        assert_eq!(report.status, Some(DelegationStatus::NoDelSupportByColumn));
        let output = report.to_string();
        assert!(output.contains("NOT DELEGABLE"));
        assert!(output.contains("Reason: NoDelSupportByColumn"));
        assert!(output.contains("context: Column:Secret"));
        assert_eq!(output, report.to_string());
    }

    #[test]
    fn test_report_serializes() {
        let expr = ExprBuilder::new().first_name("Secret");
        let reason = rejection(expr.id());
        let report = DelegationReport::new(
            "Filter",
            DelegationCapability::FILTER,
            &expr,
            Verdict::rejected(reason.clone()),
            vec![reason],
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["delegable"], false);
        assert_eq!(value["status"], "NoDelSupportByColumn");
        assert_eq!(value["capability"], serde_json::json!(["filter"]));
        assert_eq!(value["rejections"][0]["node_kind"], "first_name");
    }
}
