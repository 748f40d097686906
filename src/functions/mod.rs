//! # Function Descriptions
//!
//! Functions callable from formulas, the capability each requires from a
//! data source, and the per-function override of the call-node rule.

pub mod builtins;
pub mod errors;
pub mod function;
pub mod registry;

pub use builtins::{AsTypeFunction, ScalarFunction, StringMatchFunction, TableFunction, UserFunction};
pub use errors::{FunctionError, FunctionResult};
pub use function::{CallInfo, DelegableFunction};
pub use registry::FunctionRegistry;
