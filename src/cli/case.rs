//! Analysis case format
//!
//! A case is the JSON hand-off of a bound expression: the enclosing
//! function, the predicate tree with the binder's per-node facts, the
//! table's capability metadata and the entities reachable through
//! expansions.
//!
//! ```json
//! {
//!   "function": "Filter",
//!   "table": { "filter": { "table_capabilities": ["equal"], "columns": { ... } } },
//!   "expression": {
//!     "kind": "binary", "op": "equal",
//!     "left":  { "kind": "first_name", "name": "Name",
//!                "facts": { "row_scoped": true,
//!                           "name": { "kind": "local_column", "path": "Name" } } },
//!     "right": { "kind": "literal", "value": "x" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use super::errors::{CliError, CliResult};
use crate::binding::{DType, ExpandInfo, FactTable, Features, NameInfo, NodeFacts};
use crate::capability::{
    ColumnPath, DelegationMetadata, EntityMetadata, EntityMetadataProvider, EntityRegistry,
};
use crate::delegation::{BinaryOpDelegationStrategy, InOpDelegationStrategy, OpDelegationStrategy};
use crate::functions::{CallInfo, DelegableFunction, FunctionRegistry};
use crate::syntax::{BinaryOp, DName, Expr, ExprBuilder, UnaryOp};

/// Serialized analysis case
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisCase {
    /// Enclosing function, e.g. "Filter"
    pub function: String,

    /// Added to the configured feature flags
    #[serde(default)]
    pub features: Features,

    /// Capability metadata of the source table
    #[serde(default)]
    pub table: DelegationMetadata,

    /// Entities reachable through expansions, keyed by identity
    #[serde(default)]
    pub entities: BTreeMap<String, EntityMetadata>,

    /// Operator applied to the expression, if any
    #[serde(default)]
    pub operator: Option<BinaryOp>,

    pub expression: ExprSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprSpec {
    FirstName {
        name: String,
        #[serde(default)]
        facts: FactsSpec,
    },
    Dotted {
        left: Box<ExprSpec>,
        right: String,
        #[serde(default)]
        facts: FactsSpec,
    },
    Call {
        head: String,
        #[serde(default)]
        args: Vec<ExprSpec>,
        #[serde(default)]
        facts: FactsSpec,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprSpec>,
        right: Box<ExprSpec>,
        #[serde(default)]
        facts: FactsSpec,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprSpec>,
        #[serde(default)]
        facts: FactsSpec,
    },
    Literal {
        value: serde_json::Value,
        #[serde(default)]
        facts: FactsSpec,
    },
    Other {
        description: String,
        #[serde(default)]
        facts: FactsSpec,
    },
}

/// Binder facts for one node.
///
/// Nodes are pure and synchronous unless stated otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FactsSpec {
    pub row_scoped: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub impure: bool,
    pub exempted: bool,
    pub lambda_scoped: bool,
    pub block_scoped_constant: bool,
    #[serde(rename = "type")]
    pub ty: Option<TypeSpec>,
    pub name: Option<NameSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSpec {
    OptionSet,
    OptionSetValue,
    View,
    ViewValue,
    Record {
        #[serde(default)]
        expand: Option<ExpandSpec>,
    },
    Other,
}

/// Reference into an entity of the case
#[derive(Debug, Clone, Deserialize)]
pub struct ExpandSpec {
    pub entity: String,
    /// Expanded column on the parent
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameSpec {
    LocalColumn {
        path: String,
        /// Column of an outer scope rather than of the delegated table
        #[serde(default)]
        outer: bool,
    },
    ScopeRecord {
        #[serde(default)]
        outer: bool,
    },
    EntityExpansion { name: String, entity: String },
    Other,
}

/// A case resolved into analyzer inputs
pub struct LoadedCase {
    pub function: Arc<dyn DelegableFunction>,
    pub expression: Expr,
    pub facts: FactTable,
    pub table: Arc<DelegationMetadata>,
    pub operator: Option<BinaryOp>,
}

impl LoadedCase {
    /// Strategy for the case's operator; the expression is its left operand
    pub fn operator_strategy(&self) -> Option<Box<dyn OpDelegationStrategy>> {
        self.operator.map(|op| -> Box<dyn OpDelegationStrategy> {
            if op.is_membership() {
                Box::new(InOpDelegationStrategy::new(op, true))
            } else {
                Box::new(BinaryOpDelegationStrategy::new(op))
            }
        })
    }
}

impl AnalysisCase {
    pub fn from_json(content: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolves functions and entities and assigns node ids.
    ///
    /// Call heads missing from `functions` are left without call info.
    pub fn load(&self, functions: &FunctionRegistry, base_features: Features) -> CliResult<LoadedCase> {
        let function = functions.get(&self.function)?;

        let registry = EntityRegistry::new();
        for (identity, metadata) in &self.entities {
            registry.register(identity.clone(), metadata.clone())?;
        }

        let mut loader = Loader {
            builder: ExprBuilder::new(),
            facts: FactTable::new(base_features | self.features),
            functions,
            provider: Arc::new(registry),
            table: Arc::new(self.table.clone()),
        };
        let expression = loader.build(&self.expression)?;

        Ok(LoadedCase {
            function,
            expression,
            facts: loader.facts,
            table: loader.table,
            operator: self.operator,
        })
    }
}

struct Loader<'a> {
    builder: ExprBuilder,
    facts: FactTable,
    functions: &'a FunctionRegistry,
    provider: Arc<dyn EntityMetadataProvider>,
    table: Arc<DelegationMetadata>,
}

impl Loader<'_> {
    fn build(&mut self, spec: &ExprSpec) -> CliResult<Expr> {
        let (expr, facts) = match spec {
            ExprSpec::FirstName { name, facts } => (self.builder.first_name(name), facts),
            ExprSpec::Dotted { left, right, facts } => {
                let left = self.build(left)?;
                (self.builder.dotted(left, right), facts)
            }
            ExprSpec::Call { head, args, facts } => {
                let args = args
                    .iter()
                    .map(|arg| self.build(arg))
                    .collect::<CliResult<Vec<_>>>()?;
                (self.builder.call(head, args), facts)
            }
            ExprSpec::Binary {
                op,
                left,
                right,
                facts,
            } => {
                let left = self.build(left)?;
                let right = self.build(right)?;
                (self.builder.binary(*op, left, right), facts)
            }
            ExprSpec::Unary { op, operand, facts } => {
                let operand = self.build(operand)?;
                (self.builder.unary(*op, operand), facts)
            }
            ExprSpec::Literal { value, facts } => (self.builder.literal(value.clone()), facts),
            ExprSpec::Other { description, facts } => {
                (self.builder.other(description.as_str()), facts)
            }
        };

        let mut node_facts = self.node_facts(facts)?;
        if let Expr::Call(call) = &expr {
            if let Ok(function) = self.functions.get(call.head.as_str()) {
                node_facts = node_facts.with_call_info(CallInfo::new(function));
            }
        }
        self.facts.insert(expr.id(), node_facts);

        Ok(expr)
    }

    fn node_facts(&self, spec: &FactsSpec) -> CliResult<NodeFacts> {
        let mut facts = NodeFacts::new();
        if spec.row_scoped {
            facts = facts.row_scoped();
        }
        if spec.is_async {
            facts = facts.asynchronous();
        }
        if spec.impure {
            facts = facts.impure();
        }
        if spec.exempted {
            facts = facts.exempted();
        }
        if spec.lambda_scoped {
            facts = facts.lambda_scoped();
        }
        if spec.block_scoped_constant {
            facts = facts.block_scoped_constant();
        }
        if let Some(ty) = &spec.ty {
            facts = facts.with_type(self.dtype(ty)?);
        }
        if let Some(name) = &spec.name {
            facts = facts.with_name_info(self.name_info(name)?);
        }
        Ok(facts)
    }

    fn dtype(&self, spec: &TypeSpec) -> CliResult<DType> {
        Ok(match spec {
            TypeSpec::OptionSet => DType::OptionSet,
            TypeSpec::OptionSetValue => DType::OptionSetValue,
            TypeSpec::View => DType::View,
            TypeSpec::ViewValue => DType::ViewValue,
            TypeSpec::Record { expand } => DType::Record {
                expand: expand.as_ref().map(|e| self.expand_info(e)).transpose()?,
            },
            TypeSpec::Other => DType::Other,
        })
    }

    fn expand_info(&self, spec: &ExpandSpec) -> CliResult<ExpandInfo> {
        Ok(ExpandInfo::new(
            spec.entity.clone(),
            DName::new(spec.name.clone())?,
            Arc::clone(&self.provider),
        ))
    }

    fn source(&self, outer: bool) -> Option<Arc<DelegationMetadata>> {
        (!outer).then(|| Arc::clone(&self.table))
    }

    fn name_info(&self, spec: &NameSpec) -> CliResult<NameInfo> {
        Ok(match spec {
            NameSpec::LocalColumn { path, outer } => NameInfo::LocalColumn {
                path: ColumnPath::parse(path)
                    .map_err(|e| CliError::invalid_case(format!("column path '{}': {}", path, e)))?,
                source: self.source(*outer),
            },
            NameSpec::ScopeRecord { outer } => NameInfo::ScopeRecord {
                source: self.source(*outer),
            },
            NameSpec::EntityExpansion { name, entity } => {
                let name = DName::new(name.clone())?;
                NameInfo::EntityExpansion {
                    expand: ExpandInfo::new(entity.clone(), name.clone(), Arc::clone(&self.provider)),
                    name,
                }
            }
            NameSpec::Other => NameInfo::Other,
        })
    }
}
