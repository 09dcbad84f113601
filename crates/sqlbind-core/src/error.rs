//! Error and diagnostic types

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Length in characters
    pub length: usize,
}

impl Span {
    /// Create a span with line and column information
    pub fn with_location(line: usize, column: usize, length: usize) -> Self {
        Self {
            line,
            column,
            length,
        }
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Diagnostic produced for one SQL call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the default severity of its kind
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            span: None,
            help: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Get the error code string (e.g., "E0001")
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Types of diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// E0001: Bind variable used in SQL but not supplied
    MissingBindVar,
    /// E0002: Bind variable supplied but not used in SQL
    UnexpectedBindVar,
    /// E1000: SQL syntax error
    SqlSyntaxError,
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingBindVar => "E0001",
            DiagnosticKind::UnexpectedBindVar => "E0002",
            DiagnosticKind::SqlSyntaxError => "E1000",
        }
    }

    /// Numeric form of [`DiagnosticKind::code`], for hosts that filter by number
    pub fn number(&self) -> u32 {
        match self {
            DiagnosticKind::MissingBindVar => 1,
            DiagnosticKind::UnexpectedBindVar => 2,
            DiagnosticKind::SqlSyntaxError => 1000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingBindVar => "missing-bind-var",
            DiagnosticKind::UnexpectedBindVar => "unexpected-bind-var",
            DiagnosticKind::SqlSyntaxError => "sql-syntax-error",
        }
    }

    /// Syntax errors come from an approximating grammar and are reported
    /// one level below bind variable mismatches.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticKind::MissingBindVar | DiagnosticKind::UnexpectedBindVar => Severity::Error,
            DiagnosticKind::SqlSyntaxError => Severity::Warning,
        }
    }

    /// Whether `rule` (a code like "E0001" or a name like "missing-bind-var") selects this kind
    pub fn matches(&self, rule: &str) -> bool {
        rule.eq_ignore_ascii_case(self.code()) || rule.eq_ignore_ascii_case(self.name())
    }
}

/// Category of a parser failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailureKind {
    UnexpectedToken,
    Tokenizer,
    RecursionLimit,
}

impl ParseFailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParseFailureKind::UnexpectedToken => "UNEXPECTED_TOKEN",
            ParseFailureKind::Tokenizer => "TOKENIZER",
            ParseFailureKind::RecursionLimit => "RECURSION_LIMIT",
        }
    }
}

impl std::fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure reported by the SQL grammar, independent of the parser crate's error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("{message}")]
    UnexpectedToken {
        token: String,
        message: String,
        location: Option<Span>,
    },
    #[error("{message}")]
    Tokenizer {
        message: String,
        location: Option<Span>,
    },
    #[error("recursion limit exceeded")]
    RecursionLimit,
}

static FOUND_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"found: (?P<token>.+?)(?: at Line: \d+, Column: \d+)?$")
        .expect("invalid built-in token regex")
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"at Line: (?P<line>\d+), Column: (?P<column>\d+)")
        .expect("invalid built-in location regex")
});

impl ParseFailure {
    /// Classify a parser message of the form "Expected: X, found: Y at Line: L, Column: C"
    pub fn from_parser_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let token = FOUND_TOKEN
            .captures(&message)
            .map(|caps| caps["token"].to_string())
            .unwrap_or_default();
        let location = location_in(&message, token.chars().count().max(1));
        ParseFailure::UnexpectedToken {
            token,
            message,
            location,
        }
    }

    pub fn from_tokenizer_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let location = location_in(&message, 1);
        ParseFailure::Tokenizer { message, location }
    }

    pub fn kind(&self) -> ParseFailureKind {
        match self {
            ParseFailure::UnexpectedToken { .. } => ParseFailureKind::UnexpectedToken,
            ParseFailure::Tokenizer { .. } => ParseFailureKind::Tokenizer,
            ParseFailure::RecursionLimit => ParseFailureKind::RecursionLimit,
        }
    }

    /// Literal text of the offending token, falling back to the failure kind's name
    pub fn offending_token(&self) -> String {
        match self {
            ParseFailure::UnexpectedToken { token, .. } if !token.is_empty() => token.clone(),
            other => other.kind().name().to_string(),
        }
    }

    pub fn location(&self) -> Option<Span> {
        match self {
            ParseFailure::UnexpectedToken { location, .. }
            | ParseFailure::Tokenizer { location, .. } => *location,
            ParseFailure::RecursionLimit => None,
        }
    }
}

#[cfg(feature = "sql-parser")]
impl From<sqlparser::parser::ParserError> for ParseFailure {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        use sqlparser::parser::ParserError;

        match err {
            ParserError::ParserError(message) => ParseFailure::from_parser_message(message),
            ParserError::TokenizerError(message) => ParseFailure::from_tokenizer_message(message),
            ParserError::RecursionLimitExceeded => ParseFailure::RecursionLimit,
        }
    }
}

fn location_in(message: &str, length: usize) -> Option<Span> {
    let caps = LOCATION.captures(message)?;
    let line = caps["line"].parse().ok()?;
    let column = caps["column"].parse().ok()?;
    Some(Span::with_location(line, column, length))
}

/// Invalid rule configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
