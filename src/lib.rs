//! delegation-analyzer - delegation analysis for formula expressions
//!
//! Decides whether the row-scoped predicate or sort key of a table function
//! (`Filter`, `LookUp`, `Sort`, ...) can be evaluated by the remote data
//! source, and explains why not when it cannot.

pub mod binding;
pub mod capability;
pub mod cli;
pub mod config;
pub mod delegation;
pub mod functions;
pub mod observability;
pub mod syntax;
