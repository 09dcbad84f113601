//! Output formatting

use sqlbind_core::{Diagnostic, Severity};

use crate::args::OutputFormat;

/// Output formatter for diagnostics
pub struct OutputFormatter {
    format: OutputFormat,
    file_name: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self { format, file_name }
    }

    /// Print diagnostics in the configured format
    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic], source: &str) {
        match self.format {
            OutputFormat::Human => self.print_human(diagnostics, source),
            OutputFormat::Json => self.print_json(diagnostics),
            OutputFormat::Sarif => self.print_sarif(diagnostics),
        }
    }

    fn print_human(&self, diagnostics: &[Diagnostic], source: &str) {
        for diag in diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "\x1b[31merror\x1b[0m",
                Severity::Warning => "\x1b[33mwarning\x1b[0m",
                Severity::Info => "\x1b[34minfo\x1b[0m",
            };

            eprintln!(
                "{}[{}/{}]: {}",
                severity_str,
                diag.code(),
                diag.kind.name(),
                diag.message
            );

            match &diag.span {
                Some(span) if span.line > 0 => {
                    eprintln!("  --> {}:{}:{}", self.file_name, span.line, span.column);

                    // Print source line with annotation
                    if let Some(source_line) = get_source_line(source, span.line) {
                        eprintln!("   |");
                        eprintln!("{:>3} | {}", span.line, source_line);

                        let padding = " ".repeat(span.column.saturating_sub(1));
                        let remaining = source_line
                            .chars()
                            .count()
                            .saturating_sub(span.column.saturating_sub(1));
                        let underline = "^".repeat(span.length.min(remaining).max(1));
                        eprintln!("   | {}{}", padding, underline);
                    }
                }
                _ => eprintln!("  --> {}", self.file_name),
            }

            if let Some(help) = &diag.help {
                eprintln!("   = help: {}", help);
            }

            eprintln!();
        }
    }

    fn print_json(&self, diagnostics: &[Diagnostic]) {
        let output = serde_json::json!({
            "file": self.file_name,
            "diagnostics": diagnostics
        });
        print_pretty(&output);
    }

    fn print_sarif(&self, diagnostics: &[Diagnostic]) {
        let results: Vec<serde_json::Value> = diagnostics
            .iter()
            .map(|d| {
                let mut location = serde_json::json!({
                    "physicalLocation": {
                        "artifactLocation": {
                            "uri": self.file_name
                        }
                    }
                });
                if let Some(span) = d.span.filter(|s| s.line > 0) {
                    location["physicalLocation"]["region"] = serde_json::json!({
                        "startLine": span.line,
                        "startColumn": span.column
                    });
                }

                serde_json::json!({
                    "ruleId": d.code(),
                    "level": match d.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                        Severity::Info => "note",
                    },
                    "message": {
                        "text": d.message
                    },
                    "locations": [location]
                })
            })
            .collect();

        let sarif = serde_json::json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "sqlbind",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        });

        print_pretty(&sarif);
    }
}

/// Print a JSON value, pretty if serialization succeeds
pub fn print_pretty(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

/// Get a specific line from source (1-indexed)
fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}
