//! Typed expression tree consumed by delegation analysis
//!
//! The tree is produced and owned by the binder; analysis only reads it.
//! Every node carries a `NodeId` under which the binder records its facts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::name::DName;
use crate::capability::DelegationCapability;

/// Identity of a node within one compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node kinds relevant to delegation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Call,
    DottedName,
    FirstName,
    BinaryOp,
    UnaryOp,
    Literal,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Call => "Call",
            NodeKind::DottedName => "DottedName",
            NodeKind::FirstName => "FirstName",
            NodeKind::BinaryOp => "BinaryOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::Literal => "Literal",
            NodeKind::Other => "Other",
        }
    }

    /// Kinds that may be delegated while async when the feature allows it
    pub fn is_async_delegable(&self) -> bool {
        matches!(self, NodeKind::Call | NodeKind::FirstName | NodeKind::DottedName)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    In,
    ExactIn,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
            BinaryOp::In => "in",
            BinaryOp::ExactIn => "exactin",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Capability the data source must expose to evaluate this operator
    pub fn capability(&self) -> DelegationCapability {
        match self {
            BinaryOp::Equal => DelegationCapability::EQUAL,
            BinaryOp::NotEqual => DelegationCapability::NOT_EQUAL,
            BinaryOp::Less => DelegationCapability::LESS_THAN,
            BinaryOp::LessEqual => DelegationCapability::LESS_THAN_OR_EQUAL,
            BinaryOp::Greater => DelegationCapability::GREATER_THAN,
            BinaryOp::GreaterEqual => DelegationCapability::GREATER_THAN_OR_EQUAL,
            BinaryOp::And => DelegationCapability::AND,
            BinaryOp::Or => DelegationCapability::OR,
            BinaryOp::In => DelegationCapability::IN,
            BinaryOp::ExactIn => DelegationCapability::EXACT_IN,
            BinaryOp::Add => DelegationCapability::ADD,
            BinaryOp::Sub => DelegationCapability::SUB,
            BinaryOp::Mul => DelegationCapability::MUL,
            BinaryOp::Div => DelegationCapability::DIV,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, BinaryOp::In | BinaryOp::ExactIn)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "Not",
            UnaryOp::Negate => "-",
        }
    }

    pub fn capability(&self) -> DelegationCapability {
        match self {
            UnaryOp::Not => DelegationCapability::NOT,
            UnaryOp::Negate => DelegationCapability::NEGATE,
        }
    }
}

/// Function invocation `head(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallNode {
    pub id: NodeId,
    pub head: DName,
    pub args: Vec<Expr>,
}

/// Member access `left.right`
#[derive(Debug, Clone, PartialEq)]
pub struct DottedNameNode {
    pub id: NodeId,
    pub left: Box<Expr>,
    pub right: DName,
}

/// Bare identifier
#[derive(Debug, Clone, PartialEq)]
pub struct FirstNameNode {
    pub id: NodeId,
    pub name: DName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpNode {
    pub id: NodeId,
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOpNode {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    pub id: NodeId,
    pub value: serde_json::Value,
}

/// Any construct delegation analysis has no dedicated rule for
#[derive(Debug, Clone, PartialEq)]
pub struct OtherNode {
    pub id: NodeId,
    pub description: String,
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Call(CallNode),
    DottedName(DottedNameNode),
    FirstName(FirstNameNode),
    BinaryOp(BinaryOpNode),
    UnaryOp(UnaryOpNode),
    Literal(LiteralNode),
    Other(OtherNode),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Call(n) => n.id,
            Expr::DottedName(n) => n.id,
            Expr::FirstName(n) => n.id,
            Expr::BinaryOp(n) => n.id,
            Expr::UnaryOp(n) => n.id,
            Expr::Literal(n) => n.id,
            Expr::Other(n) => n.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Call(_) => NodeKind::Call,
            Expr::DottedName(_) => NodeKind::DottedName,
            Expr::FirstName(_) => NodeKind::FirstName,
            Expr::BinaryOp(_) => NodeKind::BinaryOp,
            Expr::UnaryOp(_) => NodeKind::UnaryOp,
            Expr::Literal(_) => NodeKind::Literal,
            Expr::Other(_) => NodeKind::Other,
        }
    }

    pub fn as_first_name(&self) -> Option<&FirstNameNode> {
        match self {
            Expr::FirstName(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_dotted_name(&self) -> Option<&DottedNameNode> {
        match self {
            Expr::DottedName(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match self {
            Expr::Call(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Call(n) => {
                write!(f, "{}(", n.head)?;
                for (i, arg) in n.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::DottedName(n) => write!(f, "{}.{}", n.left, n.right),
            Expr::FirstName(n) => write!(f, "{}", n.name),
            Expr::BinaryOp(n) => write!(f, "{} {} {}", n.left, n.op.as_str(), n.right),
            Expr::UnaryOp(n) => match n.op {
                UnaryOp::Not => write!(f, "Not({})", n.operand),
                UnaryOp::Negate => write!(f, "-{}", n.operand),
            },
            Expr::Literal(n) => write!(f, "{}", n.value),
            Expr::Other(n) => f.write_str(&n.description),
        }
    }
}

/// Builds expression trees with fresh node ids.
///
/// Names are passed through `DName::make_valid`.
#[derive(Debug, Default)]
pub struct ExprBuilder {
    next: u32,
}

impl ExprBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u32 {
        self.next
    }

    pub fn first_name(&mut self, name: &str) -> Expr {
        Expr::FirstName(FirstNameNode {
            id: self.next_id(),
            name: DName::make_valid(name).0,
        })
    }

    pub fn dotted(&mut self, left: Expr, right: &str) -> Expr {
        Expr::DottedName(DottedNameNode {
            id: self.next_id(),
            left: Box::new(left),
            right: DName::make_valid(right).0,
        })
    }

    pub fn call(&mut self, head: &str, args: Vec<Expr>) -> Expr {
        Expr::Call(CallNode {
            id: self.next_id(),
            head: DName::make_valid(head).0,
            args,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(BinaryOpNode {
            id: self.next_id(),
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        Expr::UnaryOp(UnaryOpNode {
            id: self.next_id(),
            op,
            operand: Box::new(operand),
        })
    }

    pub fn literal(&mut self, value: serde_json::Value) -> Expr {
        Expr::Literal(LiteralNode {
            id: self.next_id(),
            value,
        })
    }

    pub fn other(&mut self, description: impl Into<String>) -> Expr {
        Expr::Other(OtherNode {
            id: self.next_id(),
            description: description.into(),
        })
    }
}
