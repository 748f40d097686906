//! Node facts provider
//!
//! The binder records per-node facts (row scope, purity, asynchrony,
//! resolved types and names) that delegation analysis consumes. `Binding`
//! is the read interface; `FactTable` is the in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::diagnostics::DiagnosticContainer;
use super::features::Features;
use super::types::{DType, NameInfo};
use crate::capability::ColumnPath;
use crate::functions::CallInfo;
use crate::syntax::{Expr, NodeId};

/// Read interface over binder facts.
///
/// Facts are read-only for the duration of an analysis pass, except for
/// block-scoped-constant marks which the analysis may add.
pub trait Binding {
    fn is_row_scope(&self, node: NodeId) -> bool;
    fn is_async(&self, node: NodeId) -> bool;
    fn is_pure(&self, node: NodeId) -> bool;
    fn get_type(&self, node: NodeId) -> Option<&DType>;
    fn name_info(&self, node: NodeId) -> Option<&NameInfo>;
    fn call_info(&self, node: NodeId) -> Option<&CallInfo>;
    fn is_delegation_exempted(&self, node: NodeId) -> bool;
    fn is_lambda_scoped(&self, node: NodeId) -> bool;
    fn is_block_scoped_constant(&self, node: NodeId) -> bool;
    fn set_block_scoped_constant(&self, node: NodeId);
    fn features(&self) -> Features;
    fn diagnostics(&self) -> &DiagnosticContainer;
}

/// Facts recorded for a single node
#[derive(Debug, Clone)]
pub struct NodeFacts {
    pub row_scoped: bool,
    pub is_async: bool,
    pub pure: bool,
    pub delegation_exempted: bool,
    pub lambda_scoped: bool,
    pub block_scoped_constant: bool,
    pub ty: Option<DType>,
    pub name_info: Option<NameInfo>,
    pub call_info: Option<CallInfo>,
}

impl Default for NodeFacts {
    fn default() -> Self {
        Self {
            row_scoped: false,
            is_async: false,
            pure: true,
            delegation_exempted: false,
            lambda_scoped: false,
            block_scoped_constant: false,
            ty: None,
            name_info: None,
            call_info: None,
        }
    }
}

impl NodeFacts {
    /// Pure, synchronous, outside any row scope
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_scoped(mut self) -> Self {
        self.row_scoped = true;
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn impure(mut self) -> Self {
        self.pure = false;
        self
    }

    pub fn exempted(mut self) -> Self {
        self.delegation_exempted = true;
        self
    }

    pub fn lambda_scoped(mut self) -> Self {
        self.lambda_scoped = true;
        self
    }

    pub fn block_scoped_constant(mut self) -> Self {
        self.block_scoped_constant = true;
        self
    }

    pub fn with_type(mut self, ty: DType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_name_info(mut self, info: NameInfo) -> Self {
        self.name_info = Some(info);
        self
    }

    pub fn with_call_info(mut self, info: CallInfo) -> Self {
        self.call_info = Some(info);
        self
    }
}

/// In-memory binding keyed by node id.
///
/// A node without recorded facts is treated conservatively: not pure, so
/// it never proves delegable.
#[derive(Debug, Default)]
pub struct FactTable {
    facts: HashMap<NodeId, NodeFacts>,
    features: Features,
    block_scoped: Mutex<HashSet<NodeId>>,
    diagnostics: DiagnosticContainer,
}

impl FactTable {
    pub fn new(features: Features) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    /// Records facts for a node, replacing earlier ones
    pub fn insert(&mut self, node: NodeId, facts: NodeFacts) {
        self.facts.insert(node, facts);
    }

    pub fn with(mut self, node: NodeId, facts: NodeFacts) -> Self {
        self.insert(node, facts);
        self
    }

    pub fn facts(&self, node: NodeId) -> Option<&NodeFacts> {
        self.facts.get(&node)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.facts.len()
    }
}

impl Binding for FactTable {
    fn is_row_scope(&self, node: NodeId) -> bool {
        self.facts.get(&node).is_some_and(|f| f.row_scoped)
    }

    fn is_async(&self, node: NodeId) -> bool {
        self.facts.get(&node).is_some_and(|f| f.is_async)
    }

    fn is_pure(&self, node: NodeId) -> bool {
        self.facts.get(&node).is_some_and(|f| f.pure)
    }

    fn get_type(&self, node: NodeId) -> Option<&DType> {
        self.facts.get(&node)?.ty.as_ref()
    }

    fn name_info(&self, node: NodeId) -> Option<&NameInfo> {
        self.facts.get(&node)?.name_info.as_ref()
    }

    fn call_info(&self, node: NodeId) -> Option<&CallInfo> {
        self.facts.get(&node)?.call_info.as_ref()
    }

    fn is_delegation_exempted(&self, node: NodeId) -> bool {
        self.facts.get(&node).is_some_and(|f| f.delegation_exempted)
    }

    fn is_lambda_scoped(&self, node: NodeId) -> bool {
        self.facts.get(&node).is_some_and(|f| f.lambda_scoped)
    }

    fn is_block_scoped_constant(&self, node: NodeId) -> bool {
        if self.facts.get(&node).is_some_and(|f| f.block_scoped_constant) {
            return true;
        }
        self.block_scoped
            .lock()
            .map(|marks| marks.contains(&node))
            .unwrap_or(false)
    }

    fn set_block_scoped_constant(&self, node: NodeId) {
        if let Ok(mut marks) = self.block_scoped.lock() {
            marks.insert(node);
        }
    }

    fn features(&self) -> Features {
        self.features
    }

    fn diagnostics(&self) -> &DiagnosticContainer {
        &self.diagnostics
    }
}

/// Converts a first-name/dotted-name chain into a column path.
///
/// A leading whole-row name (`ThisRecord.Name`) contributes no segment.
/// Returns `None` when the chain cannot be resolved to a column.
pub fn column_path_of(node: &Expr, binding: &dyn Binding) -> Option<ColumnPath> {
    match node {
        Expr::FirstName(first) => match binding.name_info(first.id)? {
            NameInfo::LocalColumn { path, .. } => Some(path.clone()),
            NameInfo::ScopeRecord { .. } => Some(ColumnPath::root()),
            NameInfo::EntityExpansion { name, .. } => Some(ColumnPath::from(name.clone())),
            NameInfo::Other => Some(ColumnPath::from(first.name.clone())),
        },
        Expr::DottedName(dotted) => {
            column_path_of(&dotted.left, binding).map(|path| path.append(dotted.right.clone()))
        }
        _ => None,
    }
}
