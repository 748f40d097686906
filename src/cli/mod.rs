//! CLI module
//!
//! Provides command-line interface for:
//! - check: JSON verdict, hints and telemetry for one analysis case
//! - explain: human-readable delegation report

mod args;
mod case;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use case::{AnalysisCase, ExprSpec, FactsSpec, LoadedCase, NameSpec, TypeSpec};
pub use commands::{analyze, check, explain, render_explain, run, run_command, Analysis};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_input, write_error, write_response};
