//! CLI command implementations
//!
//! Both commands follow the same sequence:
//! 1. Configuration load (defaults when no file is given)
//! 2. Case load and resolution
//! 3. One validation pass
//! 4. Output on stdout; logs go to stderr

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::binding::{Binding, DocumentError};
use crate::config::{AnalyzerConfig, TelemetryMode};
use crate::delegation::{DelegationReport, DelegationValidator};
use crate::functions::FunctionRegistry;
use crate::observability::{
    log_event, log_event_with_fields, DiagnosticEntry, Event, FanOutTracker, LogTracker,
    MemoryTracker, MetricsRegistry, MetricsSnapshot,
};

use super::args::{Cli, Command};
use super::case::AnalysisCase;
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_response, write_text};

/// Everything one validation pass produced
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub report: DelegationReport,
    /// Hints attached to nodes
    pub diagnostics: Vec<DocumentError>,
    /// Telemetry entries; empty unless telemetry is "memory"
    pub telemetry: Vec<DiagnosticEntry>,
    pub metrics: MetricsSnapshot,
}

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a specific command
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Check { input, config } => check(input.as_deref(), config.as_deref()),
        Command::Explain { input, config } => explain(input.as_deref(), config.as_deref()),
    };

    if let Err(e) = &result {
        log_event_with_fields(
            Event::CommandFailed,
            &[("code", e.code_str()), ("message", e.message())],
        );
    }
    result
}

/// Check command: verdict, hints and telemetry as one JSON object
pub fn check(input: Option<&Path>, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let case = load_case(input)?;

    let analysis = analyze(&case, &config)?;

    write_response(serde_json::to_value(&analysis)?)
}

/// Explain command: human-readable report
pub fn explain(input: Option<&Path>, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let case = load_case(input)?;

    log_event(Event::ExplainBegin);
    let analysis = analyze(&case, &config)?;
    write_text(&render_explain(&analysis))?;
    log_event(Event::ExplainComplete);

    Ok(())
}

/// Runs one validation pass over a case
pub fn analyze(case: &AnalysisCase, config: &AnalyzerConfig) -> CliResult<Analysis> {
    let functions = FunctionRegistry::with_builtins()?;
    let loaded = case.load(&functions, config.features)?;

    let memory = Arc::new(MemoryTracker::new());
    let metrics = Arc::new(MetricsRegistry::new());
    let mut tracker = FanOutTracker::new().with(metrics.clone());
    tracker = match config.telemetry {
        TelemetryMode::Memory => tracker.with(memory.clone()),
        TelemetryMode::Log => tracker.with(Arc::new(LogTracker::default())),
        TelemetryMode::Off => tracker,
    };

    let validator = DelegationValidator::new(loaded.function.as_ref(), &tracker);
    let metadata = loaded
        .table
        .select_facet(loaded.function.delegation_capability());
    let strategy = loaded.operator_strategy();

    let report = validator.validate_with_report(
        &loaded.expression,
        &loaded.facts,
        metadata,
        strategy.as_deref(),
    );

    Ok(Analysis {
        report,
        diagnostics: loaded.facts.diagnostics().errors(),
        telemetry: memory.entries(),
        metrics: metrics.snapshot(),
    })
}

/// Report followed by the node hints
pub fn render_explain(analysis: &Analysis) -> String {
    let mut out = analysis.report.to_string();
    if !analysis.diagnostics.is_empty() {
        out.push_str("Hints:\n");
        for error in &analysis.diagnostics {
            out.push_str(&format!(
                "  - [{}] {} {}: {}\n",
                error.severity, error.node, error.key, error.message
            ));
        }
    }
    out
}

fn load_config(path: Option<&Path>) -> CliResult<AnalyzerConfig> {
    let config = match path {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    config.apply_logging()?;

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("log_level", &config.log_level), ("source", &source)],
    );

    Ok(config)
}

fn load_case(input: Option<&Path>) -> CliResult<AnalysisCase> {
    let content = read_input(input)?;
    let case = AnalysisCase::from_json(&content)?;

    log_event_with_fields(Event::CaseLoaded, &[("function", &case.function)]);
    if case.function.trim().is_empty() {
        return Err(CliError::invalid_case("function must not be empty"));
    }

    Ok(case)
}
