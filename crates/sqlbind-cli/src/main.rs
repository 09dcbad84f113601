//! sqlbind CLI - bind variable and syntax checker for SQL call sites

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use serde::Deserialize;
use sqlbind_core::normalize::normalize_for_parser;
use sqlbind_core::{
    BindVarSet, Diagnostic, HostArgument, Registry, Severity, ShapeInferenceResult, SqlAnalyzer,
};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::{print_pretty, OutputFormatter};

/// One call site as dumped by the host
#[derive(Debug, Deserialize)]
struct HostCall {
    function: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    args: Vec<HostArgument>,
}

/// Error and warning counts across all reported diagnostics
#[derive(Debug, Default)]
struct Totals {
    errors: usize,
    warnings: usize,
}

impl Totals {
    fn add(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            match diag.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                _ => {}
            }
        }
    }

    fn summarize(&self, quiet: bool, unit: &str, count: usize) {
        if self.errors > 0 || self.warnings > 0 {
            eprintln!();
            eprintln!(
                "Found {} error(s), {} warning(s) in {} {}(s)",
                self.errors, self.warnings, count, unit
            );
        } else if !quiet {
            eprintln!("All {} {}(s) passed validation", count, unit);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Check {
            files,
            binds,
            no_bind_vars,
            format,
            disable,
        } => {
            let config = config.merge_with_args(&files, &args.dialect, &format, &disable);
            let rules = config.compile_rules()?;
            let analyzer = SqlAnalyzer::new(&rules);
            let output_format = config.output_format();

            let supplied = if no_bind_vars || !binds.is_empty() {
                Some(BindVarSet::from_keys(&binds))
            } else {
                None
            };

            // Collect query files from config or CLI
            let mut query_files = Vec::new();
            for pattern in &config.files {
                if pattern.contains('*') {
                    for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                        query_files.push(path);
                    }
                } else {
                    query_files.push(PathBuf::from(pattern));
                }
            }

            if query_files.is_empty() {
                miette::bail!(
                    "No SQL files specified. Use positional arguments or configure in sqlbind.toml"
                );
            }

            let mut totals = Totals::default();
            for query_file in &query_files {
                let content = fs::read_to_string(query_file).into_diagnostic()?;
                let diagnostics = filter_disabled(
                    analyzer.analyze_call_bind_vars(&content, supplied.as_ref()),
                    &config.disable,
                );

                if !diagnostics.is_empty() {
                    let formatter =
                        OutputFormatter::new(output_format, query_file.display().to_string());
                    formatter.print_diagnostics(&diagnostics, &content);
                    totals.add(&diagnostics);
                }
            }

            totals.summarize(args.quiet, "file", query_files.len());
            Ok(totals.errors > 0)
        }

        Command::Calls {
            file,
            format,
            disable,
        } => {
            let config = config.merge_with_args(&[], &args.dialect, &format, &disable);
            let registry = Registry::new(config.compile_rules()?);
            let call_analyzers = registry.call_argument_analyzers();
            let output_format = config.output_format();

            let content = fs::read_to_string(&file).into_diagnostic()?;
            let calls: Vec<HostCall> = serde_json::from_str(&content).into_diagnostic()?;

            let mut totals = Totals::default();
            for call in &calls {
                let Some(analyzer) = call_analyzers.get(call.function.as_str()) else {
                    tracing::debug!(function = %call.function, "skipping unregistered function");
                    continue;
                };
                let diagnostics = filter_disabled(analyzer.analyze(&call.args), &config.disable);
                if diagnostics.is_empty() {
                    continue;
                }

                let location = call
                    .location
                    .clone()
                    .unwrap_or_else(|| format!("{} call", call.function));
                let source = call
                    .args
                    .get(analyzer.site().sql_arg)
                    .and_then(|arg| arg.literal.as_deref())
                    .unwrap_or_default();
                OutputFormatter::new(output_format, location)
                    .print_diagnostics(&diagnostics, source);
                totals.add(&diagnostics);
            }

            totals.summarize(args.quiet, "call", calls.len());
            Ok(totals.errors > 0)
        }

        Command::Shape { file } => {
            let config = config.merge_with_args(&[], &args.dialect, &None, &[]);
            let rules = config.compile_rules()?;
            let content = fs::read_to_string(&file).into_diagnostic()?;

            match SqlAnalyzer::new(&rules).infer_return_shape(content.trim()) {
                ShapeInferenceResult::Shape(shape) => {
                    let columns: serde_json::Map<String, serde_json::Value> = shape
                        .iter()
                        .map(|(name, ty)| (name.to_string(), serde_json::json!(ty)))
                        .collect();
                    print_pretty(&serde_json::json!({ "columns": columns }));
                }
                ShapeInferenceResult::Unknown => println!("unknown"),
            }

            Ok(false)
        }

        Command::Parse { file } => {
            // Normalize and display AST (for debugging)
            let config = config.merge_with_args(&[], &args.dialect, &None, &[]);
            let content = fs::read_to_string(&file).into_diagnostic()?;
            let normalized = normalize_for_parser(&content);
            println!("Normalized: {}", normalized.trim());
            println!();

            use sqlparser::parser::Parser;

            let dialect = config.dialect()?.parser_dialect();
            match Parser::parse_sql(dialect.as_ref(), &normalized) {
                Ok(statements) => {
                    for (i, stmt) in statements.iter().enumerate() {
                        println!("Statement {}:", i + 1);
                        println!("{:#?}", stmt);
                        println!();
                    }
                }
                Err(e) => {
                    eprintln!("Parse error: {}", e);
                    return Ok(true);
                }
            }

            Ok(false)
        }
    }
}

/// Drop diagnostics whose code or name is listed in `disabled`
fn filter_disabled(diagnostics: Vec<Diagnostic>, disabled: &[String]) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .filter(|d| !disabled.iter().any(|rule| d.kind.matches(rule)))
        .collect()
}
