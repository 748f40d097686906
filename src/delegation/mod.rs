//! Delegation analysis
//!
//! Recursive, capability-driven check of whether each sub-expression of a
//! row-scoped lambda can be evaluated by the remote data source instead of
//! locally. Rejections are reported as localized hints on the binding and
//! as entries on a `DelegationTracker`; they never change a verdict.
//!
//! # Usage
//!
//! ```ignore
//! let filter = TableFunction::filter();
//! let tracker = MemoryTracker::new();
//! let validator = DelegationValidator::new(&filter, &tracker);
//!
//! let delegable = validator.validate(&predicate, &facts, &metadata, None);
//! ```

pub mod hints;
mod report;
mod status;
mod strategy;
mod validator;

pub use hints::Hint;
pub use report::DelegationReport;
pub use status::{
    async_or_impure_context, entity_not_found_context, kind_context,
    no_del_support_by_column_context, undelegatable_function_context, DelegationStatus,
};
pub use strategy::{
    BinaryOpDelegationStrategy, InOpDelegationStrategy, OpDelegationStrategy,
    StringMatchDelegationStrategy, UnaryOpDelegationStrategy,
};
pub use validator::{DelegationValidator, Rejection, ValidationPass, Verdict};
