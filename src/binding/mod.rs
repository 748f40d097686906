//! Binder-facing facts consumed by delegation analysis
//!
//! The binder itself is external. This module defines the facts it
//! supplies per node, the diagnostic channel hints are written to, and an
//! in-memory fact table used by the CLI and tests.

mod binding;
mod diagnostics;
mod features;
mod types;

pub use binding::{column_path_of, Binding, FactTable, NodeFacts};
pub use diagnostics::{DiagnosticContainer, DocumentError, DocumentErrorSeverity, ErrorResourceKey};
pub use features::Features;
pub use types::{DType, ExpandInfo, NameInfo};
