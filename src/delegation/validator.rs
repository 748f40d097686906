//! Delegation validator
//!
//! Decides, node by node, whether a sub-expression of a row-scoped lambda
//! can be evaluated by the remote data source.
//!
//! # Reporting
//!
//! Every rule returns a `Verdict`. A rejection is emitted where it is
//! created: one hint into the binding's diagnostic container and one entry
//! into the tracker. A node emits at most once per pass; a parent that fails
//! because a child failed propagates the child's verdict.

use std::cell::RefCell;
use std::collections::HashSet;

use serde::Serialize;

use super::hints::Hint;
use super::report::DelegationReport;
use super::status::{self, DelegationStatus};
use super::strategy::{
    BinaryOpDelegationStrategy, InOpDelegationStrategy, OpDelegationStrategy,
    UnaryOpDelegationStrategy,
};
use crate::binding::{column_path_of, Binding, DocumentErrorSeverity, ErrorResourceKey, NameInfo};
use crate::capability::{CapabilityMetadata, ColumnPath, DelegationCapability};
use crate::functions::DelegableFunction;
use crate::observability::{DelegationTracker, DiagnosticEntry, Event, Logger};
use crate::syntax::{
    BinaryOpNode, CallNode, DName, DottedNameNode, Expr, FirstNameNode, NodeId, NodeKind, UnaryOp,
    UnaryOpNode,
};

/// Why a node was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub status: DelegationStatus,
    pub node: NodeId,
    pub node_kind: NodeKind,
    pub key: ErrorResourceKey,
    pub message: String,
    pub context: String,
}

/// Outcome of a delegation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub reason: Option<Rejection>,
}

impl Verdict {
    pub fn delegable() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: Rejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn status(&self) -> Option<DelegationStatus> {
        self.reason.as_ref().map(|r| r.status)
    }
}

/// Structural classification of a row-scoped dotted name
enum DottedShape {
    /// Rooted at an exempted lambda name
    Exempted,
    /// Resolvable as a column path
    Resolvable,
    /// Left side has no delegable shape
    Unsupported,
    /// A call on the left was rejected
    Rejected(Verdict),
}

/// Delegation validator for one enclosing function.
///
/// Holds no state across calls; each `validate` runs an independent pass.
pub struct DelegationValidator<'a> {
    function: &'a dyn DelegableFunction,
    tracker: &'a dyn DelegationTracker,
}

impl<'a> DelegationValidator<'a> {
    pub fn new(function: &'a dyn DelegableFunction, tracker: &'a dyn DelegationTracker) -> Self {
        assert!(
            !function.name().is_empty(),
            "delegation validator requires a named function"
        );
        Self { function, tracker }
    }

    pub fn function(&self) -> &dyn DelegableFunction {
        self.function
    }

    /// Validates `node` and returns whether it can be delegated.
    ///
    /// `op` is the operator applied to the node, if any. Without one the
    /// operator check passes.
    pub fn validate(
        &self,
        node: &Expr,
        binding: &dyn Binding,
        metadata: &CapabilityMetadata,
        op: Option<&dyn OpDelegationStrategy>,
    ) -> bool {
        self.validate_with_report(node, binding, metadata, op).delegable
    }

    /// Validates `node` and returns the verdict with every rejection made
    /// during the pass.
    pub fn validate_with_report(
        &self,
        node: &Expr,
        binding: &dyn Binding,
        metadata: &CapabilityMetadata,
        op: Option<&dyn OpDelegationStrategy>,
    ) -> DelegationReport {
        let node_id = node.id().to_string();
        Logger::trace(
            Event::DelegationCheckBegin.as_str(),
            &[("function", self.function.name()), ("node", &node_id)],
        );

        let pass = ValidationPass::new(self.function, binding, self.tracker);
        let verdict = pass.validate_node(node, metadata, op);
        self.tracker.record_verdict(verdict.valid);

        Logger::trace(
            Event::DelegationCheckComplete.as_str(),
            &[
                ("delegable", if verdict.valid { "true" } else { "false" }),
                ("function", self.function.name()),
                ("node", &node_id),
            ],
        );

        DelegationReport::new(
            self.function.name(),
            self.function.delegation_capability(),
            node,
            verdict,
            pass.into_rejections(),
        )
    }
}

/// State of a single validation pass.
///
/// Passed to function overrides so they can validate their arguments with
/// the same rules and reporting.
pub struct ValidationPass<'a> {
    function: &'a dyn DelegableFunction,
    binding: &'a dyn Binding,
    tracker: &'a dyn DelegationTracker,
    emitted: RefCell<HashSet<NodeId>>,
    rejections: RefCell<Vec<Rejection>>,
}

impl<'a> ValidationPass<'a> {
    pub fn new(
        function: &'a dyn DelegableFunction,
        binding: &'a dyn Binding,
        tracker: &'a dyn DelegationTracker,
    ) -> Self {
        Self {
            function,
            binding,
            tracker,
            emitted: RefCell::new(HashSet::new()),
            rejections: RefCell::new(Vec::new()),
        }
    }

    /// Function whose lambda is being validated
    pub fn function(&self) -> &dyn DelegableFunction {
        self.function
    }

    pub fn binding(&self) -> &dyn Binding {
        self.binding
    }

    /// Rejections emitted so far, in emission order
    pub fn rejections(&self) -> Vec<Rejection> {
        self.rejections.borrow().clone()
    }

    pub fn into_rejections(self) -> Vec<Rejection> {
        self.rejections.into_inner()
    }

    /// Rejects a node and emits its hint and tracker entry.
    ///
    /// A node already rejected in this pass is not reported again.
    pub fn reject(
        &self,
        node: NodeId,
        node_kind: NodeKind,
        status: DelegationStatus,
        hint: Hint,
        context: impl Into<String>,
    ) -> Verdict {
        let rejection = Rejection {
            status,
            node,
            node_kind,
            key: hint.key,
            message: hint.message,
            context: context.into(),
        };

        if self.emitted.borrow_mut().insert(node) {
            self.binding.diagnostics().ensure_error(
                DocumentErrorSeverity::Warning,
                node,
                rejection.key,
                rejection.message.clone(),
            );

            let entry = DiagnosticEntry::new(
                status,
                node,
                node_kind,
                self.function.name(),
                rejection.context.clone(),
            );
            self.tracker.record(&entry);

            let node_str = node.to_string();
            Logger::trace(
                Event::DelegationRejected.as_str(),
                &[
                    ("context", &rejection.context),
                    ("function", self.function.name()),
                    ("node", &node_str),
                    ("status", status.as_str()),
                ],
            );

            self.rejections.borrow_mut().push(rejection.clone());
        }

        Verdict::rejected(rejection)
    }

    fn reject_with_default_hint(
        &self,
        node: NodeId,
        kind: NodeKind,
        status: DelegationStatus,
        context: impl Into<String>,
    ) -> Verdict {
        self.reject(
            node,
            kind,
            status,
            Hint::suggest_remote_execution(self.function.name()),
            context,
        )
    }

    fn reject_column(&self, node: &Expr, column: &str) -> Verdict {
        self.reject(
            node.id(),
            node.kind(),
            DelegationStatus::NoDelSupportByColumn,
            Hint::op_not_supported_by_column(column),
            status::no_del_support_by_column_context(column),
        )
    }

    /// Validates any node.
    pub fn validate_node(
        &self,
        node: &Expr,
        metadata: &CapabilityMetadata,
        op: Option<&dyn OpDelegationStrategy>,
    ) -> Verdict {
        match node {
            Expr::Literal(_) => return Verdict::delegable(),
            Expr::Call(call) => return self.call_verdict(call, metadata),
            _ => {}
        }

        if !self.binding.is_row_scope(node.id()) {
            if let Expr::DottedName(dotted) = node {
                if self.is_option_set_or_view_access(dotted) {
                    return Verdict::delegable();
                }
            }
            return self.async_or_impure_verdict(node.id(), node.kind());
        }

        match node {
            Expr::FirstName(first) => self.first_name_verdict(node, first, op),
            Expr::DottedName(dotted) => self.dotted_name_verdict(node, dotted, metadata, op),
            Expr::BinaryOp(binary) => self.binary_op_verdict(node, binary, metadata),
            Expr::UnaryOp(unary) => self.unary_op_verdict(node, unary, metadata),
            Expr::Other(_) => {
                let verdict = self.impurity_verdict(node.id(), node.kind());
                if !verdict.valid {
                    return verdict;
                }
                self.reject_with_default_hint(
                    node.id(),
                    node.kind(),
                    DelegationStatus::Other,
                    status::kind_context(node.kind(), true),
                )
            }
            Expr::Literal(_) | Expr::Call(_) => Verdict::delegable(),
        }
    }

    /// Rejects impure nodes unless impure delegation is enabled.
    fn impurity_verdict(&self, node: NodeId, kind: NodeKind) -> Verdict {
        let features = self.binding.features();
        if !self.binding.is_pure(node) && !features.allow_impure_node_delegation {
            return self.reject_with_default_hint(
                node,
                kind,
                DelegationStatus::ImpureNode,
                status::async_or_impure_context(kind, self.binding.is_async(node), false),
            );
        }
        Verdict::delegable()
    }

    /// Generic check blocking impure and async nodes.
    pub fn async_or_impure_verdict(&self, node: NodeId, kind: NodeKind) -> Verdict {
        let verdict = self.impurity_verdict(node, kind);
        if !verdict.valid {
            return verdict;
        }

        if !self.binding.is_async(node) {
            return Verdict::delegable();
        }

        // The async waiver covers name and call kinds only.
        if self.binding.features().allow_async_delegation && kind.is_async_delegable() {
            return Verdict::delegable();
        }

        self.reject_with_default_hint(
            node,
            kind,
            DelegationStatus::AsyncPredicate,
            status::async_or_impure_context(kind, true, true),
        )
    }

    fn is_option_set_or_view_access(&self, dotted: &DottedNameNode) -> bool {
        use crate::binding::DType;

        matches!(
            (self.binding.get_type(dotted.left.id()), self.binding.get_type(dotted.id)),
            (Some(DType::OptionSet), Some(DType::OptionSetValue))
                | (Some(DType::View), Some(DType::ViewValue))
        )
    }

    fn first_name_verdict(
        &self,
        node: &Expr,
        first: &FirstNameNode,
        op: Option<&dyn OpDelegationStrategy>,
    ) -> Verdict {
        let verdict = self.async_or_impure_verdict(node.id(), node.kind());
        if !verdict.valid {
            return verdict;
        }
        self.delegatable_column_verdict(node, first, op, self.function.delegation_capability())
    }

    /// Verifies that a row-scoped column reference supports `capability`
    /// and, when given, the operator applied to it.
    ///
    /// # Panics
    ///
    /// If `first` is not row-scoped.
    pub fn delegatable_column_verdict(
        &self,
        node: &Expr,
        first: &FirstNameNode,
        op: Option<&dyn OpDelegationStrategy>,
        capability: DelegationCapability,
    ) -> Verdict {
        assert!(
            self.binding.is_row_scope(first.id),
            "column check on non-row-scoped name {}",
            first.name
        );

        let Some(info) = self.binding.name_info(first.id) else {
            return self.reject_with_default_hint(
                node.id(),
                node.kind(),
                DelegationStatus::Other,
                format!("Kind:{}, unresolved name {}", node.kind(), first.name),
            );
        };

        if let NameInfo::EntityExpansion { expand, .. } = info {
            if expand.entity_metadata().is_none() {
                return self.entity_not_found(node, &expand.identity);
            }
        }

        // No metadata: the name belongs to an outer scope that supplies its value.
        let Some(metadata) = info.delegation_metadata() else {
            return Verdict::delegable();
        };

        let Some(path) = column_path_of(node, self.binding) else {
            return self.reject_column(node, first.name.as_str());
        };

        let facet = metadata.select_facet(capability);
        if !facet.is_delegation_supported_by_column(&path, capability) {
            return self.reject_column(node, &path.to_dotted_syntax());
        }

        self.operator_verdict(node, facet, &path, op)
    }

    fn operator_verdict(
        &self,
        node: &Expr,
        metadata: &CapabilityMetadata,
        path: &ColumnPath,
        op: Option<&dyn OpDelegationStrategy>,
    ) -> Verdict {
        match op {
            Some(op) if !op.is_op_supported_by_column(metadata, node, path, self.binding) => self
                .reject(
                    node.id(),
                    node.kind(),
                    DelegationStatus::NoDelSupportByColumn,
                    Hint::op_not_supported_by_column(&path.to_dotted_syntax()),
                    format!(
                        "{}, Operator:{}",
                        status::no_del_support_by_column_context(&path.to_dotted_syntax()),
                        op.operator()
                    ),
                ),
            _ => Verdict::delegable(),
        }
    }

    fn entity_not_found(&self, node: &Expr, identity: &str) -> Verdict {
        Logger::warn(
            Event::EntityMetadataMissing.as_str(),
            &[("entity", identity), ("function", self.function.name())],
        );
        self.reject_with_default_hint(
            node.id(),
            node.kind(),
            DelegationStatus::Other,
            status::entity_not_found_context(node.kind(), true, identity),
        )
    }

    fn dotted_shape(&self, dotted: &DottedNameNode, metadata: &CapabilityMetadata) -> DottedShape {
        match dotted.left.as_ref() {
            Expr::FirstName(first)
                if self.binding.is_delegation_exempted(first.id)
                    && self.binding.is_lambda_scoped(first.id) =>
            {
                DottedShape::Exempted
            }
            Expr::Call(call) => {
                let verdict = self.call_verdict(call, metadata);
                if verdict.valid {
                    DottedShape::Resolvable
                } else {
                    DottedShape::Rejected(verdict)
                }
            }
            Expr::DottedName(inner) => self.dotted_shape(inner, metadata),
            Expr::FirstName(_) => DottedShape::Resolvable,
            _ => DottedShape::Unsupported,
        }
    }

    fn dotted_name_verdict(
        &self,
        node: &Expr,
        dotted: &DottedNameNode,
        metadata: &CapabilityMetadata,
        op: Option<&dyn OpDelegationStrategy>,
    ) -> Verdict {
        let verdict = self.impurity_verdict(node.id(), node.kind());
        if !verdict.valid {
            return verdict;
        }

        match self.dotted_shape(dotted, metadata) {
            DottedShape::Exempted => {
                self.binding.set_block_scoped_constant(dotted.id);
                return Verdict::delegable();
            }
            DottedShape::Rejected(verdict) => return verdict,
            DottedShape::Unsupported => {
                return self.reject_with_default_hint(
                    node.id(),
                    node.kind(),
                    DelegationStatus::Other,
                    status::kind_context(node.kind(), true),
                );
            }
            DottedShape::Resolvable => {}
        }

        // Field of a whole row supplied by an outer, non-delegable scope.
        if let Expr::FirstName(first) = dotted.left.as_ref() {
            if let Some(NameInfo::ScopeRecord { source: None }) = self.binding.name_info(first.id) {
                return Verdict::delegable();
            }
        }

        let capability = self.function.delegation_capability();
        let expand = self
            .binding
            .get_type(dotted.left.id())
            .and_then(|ty| ty.expand_info());

        let Some(expand) = expand else {
            let Some(path) = column_path_of(node, self.binding) else {
                return self.reject_column(node, &node.to_string());
            };
            if !metadata.is_delegation_supported_by_column(&path, capability) {
                return self.reject_column(node, &path.to_dotted_syntax());
            }
            return self.operator_verdict(node, metadata, &path, op);
        };

        let Some(entity) = expand.entity_metadata() else {
            return self.entity_not_found(node, &expand.identity);
        };

        let facet = entity.delegation.select_facet(capability);
        let column = entity
            .display_name_mapping
            .logical_for_display(dotted.right.as_str())
            .and_then(|logical| DName::new(logical).ok())
            .unwrap_or_else(|| dotted.right.clone());
        let path = ColumnPath::root().append(column);

        if !facet.is_delegation_supported_by_column(&path, capability) {
            return self.reject_column(node, &path.to_dotted_syntax());
        }

        self.operator_verdict(node, facet, &path, op)
    }

    /// Call rule: the function's own rule when it has one, else the generic rule.
    pub fn call_verdict(&self, call: &CallNode, metadata: &CapabilityMetadata) -> Verdict {
        match self.binding.call_info(call.id) {
            Some(info) => info.function.validate_call_node(self, call, metadata),
            None => self.generic_call_verdict(call, metadata, false),
        }
    }

    /// Generic call rule.
    ///
    /// `allow_non_block_scoped` waives the block-scoped-constant requirement
    /// for nested validations.
    pub fn generic_call_verdict(
        &self,
        call: &CallNode,
        metadata: &CapabilityMetadata,
        allow_non_block_scoped: bool,
    ) -> Verdict {
        let verdict = self.async_or_impure_verdict(call.id, NodeKind::Call);
        if !verdict.valid {
            return verdict;
        }

        if !self.binding.is_row_scope(call.id) {
            return Verdict::delegable();
        }

        if !allow_non_block_scoped && !self.binding.is_block_scoped_constant(call.id) {
            return self.reject_with_default_hint(
                call.id,
                NodeKind::Call,
                DelegationStatus::Other,
                format!("Kind:{}, isBlockScopedConstant:false", NodeKind::Call),
            );
        }

        let callee = self.binding.call_info(call.id);
        if let Some(info) = callee {
            let emitted_before = self.rejections.borrow().len();
            if info.function.is_row_scoped_server_delegatable(call, self, metadata) {
                return Verdict::delegable();
            }
            // An argument already rejected in this pass is the reason.
            if let Some(child) = self.rejections.borrow().get(emitted_before).cloned() {
                return Verdict::rejected(child);
            }
        }

        self.reject_with_default_hint(
            call.id,
            NodeKind::Call,
            DelegationStatus::UndelegatableFunction,
            status::undelegatable_function_context(callee.map(|info| info.name())),
        )
    }

    fn binary_op_verdict(
        &self,
        node: &Expr,
        binary: &BinaryOpNode,
        metadata: &CapabilityMetadata,
    ) -> Verdict {
        let verdict = self.impurity_verdict(node.id(), node.kind());
        if !verdict.valid {
            return verdict;
        }

        if !metadata.is_op_supported_by_table(binary.op.capability()) {
            return self.reject(
                node.id(),
                node.kind(),
                DelegationStatus::Other,
                Hint::op_not_supported_by_service(binary.op.as_str()),
                format!("Operator:{}, unsupported by table", binary.op.as_str()),
            );
        }

        if binary.op.is_logical() {
            for operand in [binary.left.as_ref(), binary.right.as_ref()] {
                let verdict = self.validate_node(operand, metadata, None);
                if !verdict.valid {
                    return verdict;
                }
            }
            return Verdict::delegable();
        }

        let left_row_scoped = self.binding.is_row_scope(binary.left.id());
        let right_row_scoped = self.binding.is_row_scope(binary.right.id());
        if binary.op.is_comparison() && left_row_scoped && right_row_scoped {
            return self.reject_with_default_hint(
                node.id(),
                node.kind(),
                DelegationStatus::Other,
                format!(
                    "Operator:{}, both operands are row-scoped",
                    binary.op.as_str()
                ),
            );
        }

        if binary.op.is_membership() {
            let left = InOpDelegationStrategy::new(binary.op, true);
            let right = InOpDelegationStrategy::new(binary.op, false);
            return self.operands_verdict(binary, metadata, &left, &right);
        }

        let strategy = BinaryOpDelegationStrategy::new(binary.op);
        self.operands_verdict(binary, metadata, &strategy, &strategy)
    }

    fn operands_verdict(
        &self,
        binary: &BinaryOpNode,
        metadata: &CapabilityMetadata,
        left: &dyn OpDelegationStrategy,
        right: &dyn OpDelegationStrategy,
    ) -> Verdict {
        let verdict = self.validate_node(&binary.left, metadata, Some(left));
        if !verdict.valid {
            return verdict;
        }
        self.validate_node(&binary.right, metadata, Some(right))
    }

    fn unary_op_verdict(
        &self,
        node: &Expr,
        unary: &UnaryOpNode,
        metadata: &CapabilityMetadata,
    ) -> Verdict {
        let verdict = self.impurity_verdict(node.id(), node.kind());
        if !verdict.valid {
            return verdict;
        }

        if !metadata.is_op_supported_by_table(unary.op.capability()) {
            return self.reject(
                node.id(),
                node.kind(),
                DelegationStatus::Other,
                Hint::op_not_supported_by_service(unary.op.as_str()),
                format!("Operator:{}, unsupported by table", unary.op.as_str()),
            );
        }

        match unary.op {
            UnaryOp::Not => self.validate_node(&unary.operand, metadata, None),
            UnaryOp::Negate => {
                let strategy = UnaryOpDelegationStrategy::new(unary.op);
                self.validate_node(&unary.operand, metadata, Some(&strategy))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::binding::{DType, ExpandInfo, FactTable, Features, NodeFacts};
    use crate::capability::{
        ColumnCapabilities, DelegationMetadata, DisplayNameMapping, EntityMetadata, EntityRegistry,
    };
    use crate::functions::{
        AsTypeFunction, CallInfo, ScalarFunction, StringMatchFunction, TableFunction, UserFunction,
    };
    use crate::observability::MemoryTracker;
    use crate::syntax::{BinaryOp, ExprBuilder};

    fn name(s: &str) -> DName {
        DName::new(s).unwrap()
    }

    fn path(s: &str) -> ColumnPath {
        ColumnPath::parse(s).unwrap()
    }

    fn table_metadata() -> CapabilityMetadata {
        CapabilityMetadata::new(
            DelegationCapability::FILTER
                | DelegationCapability::AND
                | DelegationCapability::OR
                | DelegationCapability::NOT
                | DelegationCapability::EQUAL
                | DelegationCapability::LESS_THAN
                | DelegationCapability::IN
                | DelegationCapability::STARTS_WITH,
        )
        .with_column(
            path("Name"),
            ColumnCapabilities::new(
                DelegationCapability::FILTER | DelegationCapability::SORT,
                DelegationCapability::EQUAL
                    | DelegationCapability::IN
                    | DelegationCapability::STARTS_WITH,
            ),
        )
        .with_column(
            path("Age"),
            ColumnCapabilities::new(DelegationCapability::FILTER, DelegationCapability::EQUAL),
        )
        .with_column(
            path("Address.City"),
            ColumnCapabilities::new(DelegationCapability::FILTER, DelegationCapability::EQUAL),
        )
    }

    fn column(metadata: &CapabilityMetadata, column: &str) -> NodeFacts {
        let source = Arc::new(DelegationMetadata::new(metadata.clone(), metadata.clone()));
        NodeFacts::new().row_scoped().with_name_info(NameInfo::LocalColumn {
            path: path(column),
            source: Some(source),
        })
    }

    #[test]
    fn test_non_row_scoped_pure_sync_is_valid() {
        let mut b = ExprBuilder::new();
        let global = b.first_name("Threshold");
        let table = FactTable::new(Features::default()).with(global.id(), NodeFacts::new());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        let validator = DelegationValidator::new(&filter, &tracker);
        assert!(validator.validate(&global, &table, &table_metadata(), None));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_async_rejected_unless_enabled() {
        let mut b = ExprBuilder::new();
        let global = b.first_name("Remote");
        let facts = NodeFacts::new().asynchronous();
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        let table = FactTable::new(Features::default()).with(global.id(), facts.clone());
        let report = validator.validate_with_report(&global, &table, &table_metadata(), None);
        assert!(!report.delegable);
        assert_eq!(report.status, Some(DelegationStatus::AsyncPredicate));

        let table = FactTable::new(Features::ALLOW_ASYNC_DELEGATION).with(global.id(), facts);
        assert!(validator.validate(&global, &table, &table_metadata(), None));
    }

    #[test]
    fn test_async_waiver_limited_to_names_and_calls() {
        let mut b = ExprBuilder::new();
        let one = b.literal(serde_json::json!(1));
        let two = b.literal(serde_json::json!(2));
        let sum = b.binary(BinaryOp::Add, one, two);
        let five = b.literal(serde_json::json!(5));
        let negated = b.unary(UnaryOp::Negate, five);
        let other = b.other("[1, 2, 3]");
        let table = FactTable::new(Features::ALLOW_ASYNC_DELEGATION)
            .with(sum.id(), NodeFacts::new().asynchronous())
            .with(negated.id(), NodeFacts::new().asynchronous())
            .with(other.id(), NodeFacts::new().asynchronous());
        let filter = TableFunction::filter();

        for node in [&sum, &negated, &other] {
            let tracker = MemoryTracker::new();
            let validator = DelegationValidator::new(&filter, &tracker);
            let report = validator.validate_with_report(node, &table, &table_metadata(), None);
            assert!(!report.delegable, "{} should be rejected", node);
            assert_eq!(report.status, Some(DelegationStatus::AsyncPredicate));
            assert_eq!(tracker.len(), 1);
        }
    }

    #[test]
    fn test_first_name_column_support() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let known = b.first_name("Name");
        let unknown = b.first_name("Secret");
        let table = FactTable::new(Features::default())
            .with(known.id(), column(&md, "Name"))
            .with(unknown.id(), column(&md, "Secret"));
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        assert!(validator.validate(&known, &table, &md, None));
        assert!(!validator.validate(&unknown, &table, &md, None));

        let entries = tracker.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, DelegationStatus::NoDelSupportByColumn);
        assert_eq!(entries[0].node, unknown.id());
        assert_eq!(table.diagnostics().errors_for(unknown.id()).len(), 1);
    }

    #[test]
    fn test_operator_strategy_applies_to_column() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let age = b.first_name("Age");
        let table = FactTable::new(Features::default()).with(age.id(), column(&md, "Age"));
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        let equal = BinaryOpDelegationStrategy::new(BinaryOp::Equal);
        let less = BinaryOpDelegationStrategy::new(BinaryOp::Less);
        assert!(validator.validate(&age, &table, &md, Some(&equal)));
        assert!(!validator.validate(&age, &table, &md, Some(&less)));
        assert_eq!(tracker.entries()[0].status, DelegationStatus::NoDelSupportByColumn);
    }

    #[test]
    fn test_outer_scope_name_is_valid() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let outer = b.first_name("Outer");
        let table = FactTable::new(Features::default()).with(
            outer.id(),
            NodeFacts::new().row_scoped().with_name_info(NameInfo::LocalColumn {
                path: path("Outer"),
                source: None,
            }),
        );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&outer, &table, &md, None));
    }

    #[test]
    fn test_unresolved_row_scoped_name_is_rejected() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Ghost");
        let table =
            FactTable::new(Features::default()).with(name_node.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        let report = DelegationValidator::new(&filter, &tracker)
            .validate_with_report(&name_node, &table, &md, None);
        assert!(!report.delegable);
        assert_eq!(report.status, Some(DelegationStatus::Other));
    }

    #[test]
    fn test_nested_column_path() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let record = b.first_name("ThisRecord");
        let address = b.dotted(record.clone(), "Address");
        let city = b.dotted(address.clone(), "City");
        let street = b.dotted(address.clone(), "Street");

        let source = Arc::new(DelegationMetadata::new(md.clone(), md.clone()));
        let table = FactTable::new(Features::default())
            .with(
                record.id(),
                NodeFacts::new()
                    .row_scoped()
                    .with_name_info(NameInfo::ScopeRecord { source: Some(source) }),
            )
            .with(address.id(), NodeFacts::new().row_scoped())
            .with(city.id(), NodeFacts::new().row_scoped())
            .with(street.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        assert!(validator.validate(&city, &table, &md, None));
        assert!(!validator.validate(&street, &table, &md, None));
        assert!(tracker.entries()[0].context.contains("Address.Street"));
    }

    #[test]
    fn test_scope_record_from_outer_scope_is_valid() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let left = b.first_name("Left");
        let field = b.dotted(left.clone(), "Anything");
        let table = FactTable::new(Features::default())
            .with(
                left.id(),
                NodeFacts::new()
                    .row_scoped()
                    .with_name_info(NameInfo::ScopeRecord { source: None }),
            )
            .with(field.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&field, &table, &md, None));
    }

    #[test]
    fn test_option_set_access_is_valid_when_async() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let set = b.first_name("Status");
        let value = b.dotted(set.clone(), "Active");
        let table = FactTable::new(Features::default())
            .with(set.id(), NodeFacts::new().with_type(DType::OptionSet))
            .with(
                value.id(),
                NodeFacts::new().asynchronous().with_type(DType::OptionSetValue),
            );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&value, &table, &md, None));
    }

    #[test]
    fn test_display_name_translated_on_expansion() {
        let md = table_metadata();
        let mut mapping = DisplayNameMapping::new();
        mapping.insert("cr_fullname", "Full Name").unwrap();
        let entity_md = CapabilityMetadata::new(DelegationCapability::FILTER).with_column(
            path("cr_fullname"),
            ColumnCapabilities::new(DelegationCapability::FILTER, DelegationCapability::EQUAL),
        );
        let registry = Arc::new(EntityRegistry::new());
        registry
            .register(
                "contacts",
                EntityMetadata::new(
                    mapping,
                    DelegationMetadata::new(entity_md.clone(), entity_md),
                ),
            )
            .unwrap();

        let mut b = ExprBuilder::new();
        let contact = b.first_name("Contact");
        let full_name = b.dotted(contact.clone(), "Full Name");
        let expand = ExpandInfo::new("contacts", name("Contact"), registry);
        let table = FactTable::new(Features::default())
            .with(
                contact.id(),
                NodeFacts::new()
                    .row_scoped()
                    .with_type(DType::Record { expand: Some(expand) }),
            )
            .with(full_name.id(), NodeFacts::new().row_scoped().asynchronous());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&full_name, &table, &md, None));
    }

    #[test]
    fn test_call_on_left_of_dotted_name() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let user = b.call("User", vec![]);
        let email = b.dotted(user.clone(), "Email");
        let table = FactTable::new(Features::default())
            .with(
                user.id(),
                NodeFacts::new().with_call_info(CallInfo::new(Arc::new(UserFunction))),
            )
            .with(email.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        // The call resolves, but a call result has no column path.
        let report = DelegationValidator::new(&filter, &tracker)
            .validate_with_report(&email, &table, &md, None);
        assert!(!report.delegable);
        assert_eq!(report.status, Some(DelegationStatus::NoDelSupportByColumn));
    }

    #[test]
    fn test_unsupported_left_shape() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let other = b.other("[1, 2]");
        let dotted = b.dotted(other.clone(), "Value");
        let table =
            FactTable::new(Features::default()).with(dotted.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        let report = DelegationValidator::new(&filter, &tracker)
            .validate_with_report(&dotted, &table, &md, None);
        assert!(!report.delegable);
        assert_eq!(report.status, Some(DelegationStatus::Other));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_logical_and_comparison_walk() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let x = b.literal(serde_json::json!("x"));
        let eq = b.binary(BinaryOp::Equal, name_node.clone(), x);
        let age = b.first_name("Age");
        let three = b.literal(serde_json::json!(3));
        let lt = b.binary(BinaryOp::Less, age.clone(), three);
        let and = b.binary(BinaryOp::And, eq.clone(), lt.clone());

        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(age.id(), column(&md, "Age"))
            .with(eq.id(), NodeFacts::new().row_scoped())
            .with(lt.id(), NodeFacts::new().row_scoped())
            .with(and.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        assert!(validator.validate(&eq, &table, &md, None));

        // Age supports only equality
        let report = validator.validate_with_report(&and, &table, &md, None);
        assert!(!report.delegable);
        assert_eq!(report.status, Some(DelegationStatus::NoDelSupportByColumn));
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].node, age.id());
    }

    #[test]
    fn test_operator_unsupported_by_table() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let x = b.literal(serde_json::json!("x"));
        let ne = b.binary(BinaryOp::NotEqual, name_node.clone(), x);
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(ne.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        let report = DelegationValidator::new(&filter, &tracker)
            .validate_with_report(&ne, &table, &md, None);
        assert!(!report.delegable);
        assert_eq!(report.rejections[0].key, crate::delegation::hints::OP_NOT_SUPPORTED_BY_SERVICE);
    }

    #[test]
    fn test_both_operands_row_scoped() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let age = b.first_name("Age");
        let eq = b.binary(BinaryOp::Equal, name_node.clone(), age.clone());
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(age.id(), column(&md, "Age"))
            .with(eq.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(!DelegationValidator::new(&filter, &tracker).validate(&eq, &table, &md, None));
        assert_eq!(tracker.entries()[0].node, eq.id());
    }

    #[test]
    fn test_in_operator_sides() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let list = b.literal(serde_json::json!(["a", "b"]));
        let membership = b.binary(BinaryOp::In, name_node.clone(), list);
        let name_node2 = b.first_name("Name");
        let text = b.literal(serde_json::json!("an"));
        let substring = b.binary(BinaryOp::In, text, name_node2.clone());

        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(name_node2.id(), column(&md, "Name"))
            .with(membership.id(), NodeFacts::new().row_scoped())
            .with(substring.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        assert!(validator.validate(&membership, &table, &md, None));
        // Name has no CONTAINS operator
        assert!(!validator.validate(&substring, &table, &md, None));
    }

    #[test]
    fn test_not_recurses_into_operand() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let x = b.literal(serde_json::json!("x"));
        let eq = b.binary(BinaryOp::Equal, name_node.clone(), x);
        let not = b.unary(UnaryOp::Not, eq.clone());
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(eq.id(), NodeFacts::new().row_scoped())
            .with(not.id(), NodeFacts::new().row_scoped());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&not, &table, &md, None));
    }

    #[test]
    fn test_starts_with_is_server_delegatable() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let prefix = b.literal(serde_json::json!("A"));
        let call = b.call("StartsWith", vec![name_node.clone(), prefix]);
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(
                call.id(),
                NodeFacts::new()
                    .row_scoped()
                    .block_scoped_constant()
                    .with_call_info(CallInfo::new(Arc::new(StringMatchFunction::starts_with()))),
            );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&call, &table, &md, None));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_ends_with_unsupported_by_table() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let suffix = b.literal(serde_json::json!("z"));
        let call = b.call("EndsWith", vec![name_node.clone(), suffix]);
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(
                call.id(),
                NodeFacts::new()
                    .row_scoped()
                    .block_scoped_constant()
                    .with_call_info(CallInfo::new(Arc::new(StringMatchFunction::ends_with()))),
            );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        let report = DelegationValidator::new(&filter, &tracker)
            .validate_with_report(&call, &table, &md, None);
        assert_eq!(report.status, Some(DelegationStatus::UndelegatableFunction));
    }

    #[test]
    fn test_user_override_is_always_valid() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let call = b.call("User", vec![]);
        let table = FactTable::new(Features::default()).with(
            call.id(),
            NodeFacts::new()
                .row_scoped()
                .asynchronous()
                .with_call_info(CallInfo::new(Arc::new(UserFunction))),
        );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        assert!(DelegationValidator::new(&filter, &tracker).validate(&call, &table, &md, None));
    }

    #[test]
    fn test_as_type_requires_table_support() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let call = b.call("AsType", vec![name_node.clone()]);
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(
                call.id(),
                NodeFacts::new()
                    .row_scoped()
                    .with_call_info(CallInfo::new(Arc::new(AsTypeFunction))),
            );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        assert!(!validator.validate(&call, &table, &md, None));

        let with_as_type = CapabilityMetadata::new(DelegationCapability::AS_TYPE)
            .with_column(
                path("Name"),
                ColumnCapabilities::new(DelegationCapability::FILTER, DelegationCapability::NONE),
            );
        assert!(validator.validate(&call, &table, &with_as_type, None));
    }

    #[test]
    fn test_block_scoped_constant_required_for_row_scoped_call() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let name_node = b.first_name("Name");
        let call = b.call("Len", vec![name_node.clone()]);
        let table = FactTable::new(Features::default())
            .with(name_node.id(), column(&md, "Name"))
            .with(
                call.id(),
                NodeFacts::new()
                    .row_scoped()
                    .with_call_info(CallInfo::new(Arc::new(ScalarFunction::new("Len")))),
            );
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();

        let report = DelegationValidator::new(&filter, &tracker)
            .validate_with_report(&call, &table, &md, None);
        assert!(!report.delegable);
        assert_eq!(report.status, Some(DelegationStatus::Other));
    }

    #[test]
    fn test_impure_allowed_by_feature() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let call = b.call("Rand", vec![]);
        let facts = NodeFacts::new()
            .impure()
            .with_call_info(CallInfo::new(Arc::new(ScalarFunction::new("Rand"))));
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let validator = DelegationValidator::new(&filter, &tracker);

        let table = FactTable::new(Features::default()).with(call.id(), facts.clone());
        assert!(!validator.validate(&call, &table, &md, None));
        assert_eq!(tracker.entries()[0].status, DelegationStatus::ImpureNode);

        let table =
            FactTable::new(Features::ALLOW_IMPURE_NODE_DELEGATION).with(call.id(), facts);
        assert!(validator.validate(&call, &table, &md, None));
    }

    #[test]
    #[should_panic]
    fn test_column_check_requires_row_scope() {
        let md = table_metadata();
        let mut b = ExprBuilder::new();
        let node = b.first_name("Name");
        let Expr::FirstName(first) = &node else {
            unreachable!()
        };
        let table = FactTable::new(Features::default()).with(node.id(), NodeFacts::new());
        let tracker = MemoryTracker::new();
        let filter = TableFunction::filter();
        let pass = ValidationPass::new(&filter, &table, &tracker);

        pass.delegatable_column_verdict(&node, first, None, DelegationCapability::FILTER);
    }
}
