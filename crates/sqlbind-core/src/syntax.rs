//! Syntax validation against the approximating grammar

use serde::{Deserialize, Serialize};
use sqlparser::parser::Parser;

use crate::config::Rules;
use crate::error::{ParseFailure, ParseFailureKind, Span};
use crate::normalize::NormalizedSql;

/// Why a syntax error was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressReason {
    /// The raw SQL uses a construct the grammar cannot parse at all
    UnsupportedConstruct,
    /// The offending token is valid in the target dialect
    ApproximationGap,
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuppressReason::UnsupportedConstruct => write!(f, "unsupported construct"),
            SuppressReason::ApproximationGap => write!(f, "approximation gap"),
        }
    }
}

/// Result of validating one SQL statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ParseOutcome {
    Valid,
    SyntaxError {
        raw_token: String,
        message: String,
        error_kind: ParseFailureKind,
        location: Option<Span>,
    },
    Suppressed {
        reason: SuppressReason,
    },
}

impl ParseOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParseOutcome::Valid)
    }
}

/// Validate SQL syntax, dropping errors that stem from grammar gaps
pub fn validate(sql: &str, rules: &Rules) -> ParseOutcome {
    if rules.gives_up_on(sql) {
        return ParseOutcome::Suppressed {
            reason: SuppressReason::UnsupportedConstruct,
        };
    }

    let normalized = NormalizedSql::for_parser(sql);
    let dialect = rules.dialect().parser_dialect();
    match Parser::parse_sql(dialect.as_ref(), normalized.as_str()) {
        Ok(_) => ParseOutcome::Valid,
        Err(e) => classify_failure(&ParseFailure::from(e), &normalized, rules),
    }
}

/// Turn a parse failure into a reported or suppressed outcome.
///
/// Positions are reported against the raw SQL, not the normalized text.
fn classify_failure(
    failure: &ParseFailure,
    normalized: &NormalizedSql<'_>,
    rules: &Rules,
) -> ParseOutcome {
    let raw_token = failure.offending_token().to_uppercase();
    let word_before = failure
        .location()
        .and_then(|span| normalized.word_before(span))
        .map(str::to_uppercase);

    if rules.is_suppressed_token(&raw_token)
        || word_before.is_some_and(|word| rules.is_suppressed_token(&word))
        || rules.is_approximation_gap(normalized.as_str())
    {
        return ParseOutcome::Suppressed {
            reason: SuppressReason::ApproximationGap,
        };
    }

    let mut message = failure.to_string();
    let location = failure.location().map(|span| {
        let raw = normalized.raw_span(span);
        message = message.replace(
            &format!("Line: {}, Column: {}", span.line, span.column),
            &format!("Line: {}, Column: {}", raw.line, raw.column),
        );
        raw
    });

    ParseOutcome::SyntaxError {
        raw_token,
        message,
        error_kind: failure.kind(),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::dialect::SqlDialect;

    fn check(sql: &str) -> ParseOutcome {
        validate(sql, &Rules::default())
    }

    #[test]
    fn test_valid_select() {
        assert_eq!(check("SELECT 1 FROM dual"), ParseOutcome::Valid);
    }

    #[test]
    fn test_bind_vars_and_templates_parse() {
        assert!(check("SELECT a FROM {{TK}}t WHERE b = :b AND c = 'x:y'").is_valid());
        assert!(check("UPDATE t SET a = :a WHERE id = :id").is_valid());
    }

    #[test]
    fn test_incomplete_statement_is_syntax_error() {
        match check("SELECT foo bar FROM") {
            ParseOutcome::SyntaxError {
                raw_token,
                error_kind,
                ..
            } => {
                assert!(!raw_token.is_empty());
                assert_eq!(error_kind, ParseFailureKind::UnexpectedToken);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_carries_location() {
        match check("SELECT a FROM t t2 t3") {
            ParseOutcome::SyntaxError {
                raw_token,
                location,
                ..
            } => {
                assert_eq!(raw_token, "T3");
                assert_eq!(location.map(|s| s.line), Some(1));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_procedural_block_is_suppressed() {
        assert_eq!(
            check("BEGIN update_stats(); END;"),
            ParseOutcome::Suppressed {
                reason: SuppressReason::UnsupportedConstruct
            }
        );
    }

    #[test]
    fn test_suppressed_token_is_dropped() {
        let config = AnalyzerConfig {
            suppressed_tokens: vec!["t3".into()],
            ..AnalyzerConfig::default()
        };
        let rules = Rules::from_config(&config, SqlDialect::Generic).unwrap();
        assert_eq!(
            validate("SELECT a FROM t t2 t3", &rules),
            ParseOutcome::Suppressed {
                reason: SuppressReason::ApproximationGap
            }
        );
    }

    #[test]
    fn test_location_points_into_raw_sql() {
        match check("SELECT a FROM t WHERE b = :bbbb AND c = 'hello world' t3") {
            ParseOutcome::SyntaxError {
                raw_token,
                message,
                location,
                ..
            } => {
                assert_eq!(raw_token, "T3");
                assert_eq!(location, Some(Span::with_location(1, 55, 2)));
                assert!(message.ends_with("at Line: 1, Column: 55"), "{}", message);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_location_after_template_on_later_line() {
        match check("SELECT a\nFROM {{TK}}t t2 t3") {
            ParseOutcome::SyntaxError { location, .. } => {
                assert_eq!(location, Some(Span::with_location(2, 17, 2)));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_dialect_constructs_are_suppressed() {
        let constructs = [
            "SELECT a FROM t MINUS SELECT a FROM u",
            "SELECT MAX(a) KEEP (DENSE_RANK FIRST ORDER BY b) FROM t",
            "SELECT a FROM t CONNECT BY PRIOR a = b",
        ];
        for sql in constructs {
            assert_eq!(
                check(sql),
                ParseOutcome::Suppressed {
                    reason: SuppressReason::ApproximationGap
                },
                "{}",
                sql
            );
        }
    }

    #[test]
    fn test_every_default_token_is_suppressed_where_reported() {
        let rules = Rules::default();
        for token in crate::config::DEFAULT_SUPPRESSED_TOKENS {
            let sql = format!("SELECT a FROM t {} x", token);
            let normalized = NormalizedSql::for_parser(&sql);

            let found = ParseFailure::from_parser_message(format!(
                "Expected: end of statement, found: {} at Line: 1, Column: 17",
                token.to_lowercase()
            ));
            assert_eq!(
                classify_failure(&found, &normalized, &rules),
                ParseOutcome::Suppressed {
                    reason: SuppressReason::ApproximationGap
                }
            );

            let column = 18 + token.len();
            let after = ParseFailure::from_parser_message(format!(
                "Expected: end of statement, found: x at Line: 1, Column: {}",
                column
            ));
            assert_eq!(
                classify_failure(&after, &normalized, &rules),
                ParseOutcome::Suppressed {
                    reason: SuppressReason::ApproximationGap
                }
            );
        }
    }

    #[test]
    fn test_dialect_keyword_inside_literal_is_not_a_gap() {
        assert!(matches!(
            check("SELECT a FROM t WHERE note = 'connect by' t3"),
            ParseOutcome::SyntaxError { .. }
        ));
    }
}
