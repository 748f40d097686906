//! Expression syntax consumed by delegation analysis
//!
//! The parser and binder are external; this module only models the typed
//! tree they hand over plus the name type shared with schema metadata.

mod name;
mod node;

pub use name::{DName, NameError};
pub use node::{
    BinaryOp, BinaryOpNode, CallNode, DottedNameNode, Expr, ExprBuilder, FirstNameNode,
    LiteralNode, NodeId, NodeKind, OtherNode, UnaryOp, UnaryOpNode,
};
