//! Call-site analyzer facade

use crate::bind_vars::{compare, extract_referenced, find_similar, BindVarSet};
use crate::config::Rules;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::shape::{infer_shape, ShapeInferenceResult};
use crate::syntax::{validate, ParseOutcome};

/// SQL Analyzer - checks bind variables and syntax, and infers result shapes
pub struct SqlAnalyzer<'a> {
    rules: &'a Rules,
}

impl<'a> SqlAnalyzer<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Self { rules }
    }

    /// Check the SQL argument of a call site.
    ///
    /// The syntax check always runs for non-empty SQL. Bind variables are
    /// compared only when the supplied set is statically known.
    pub fn analyze_call_bind_vars(
        &self,
        sql: &str,
        known_actual: Option<&BindVarSet>,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if sql.is_empty() {
            return diagnostics;
        }

        if let ParseOutcome::SyntaxError {
            raw_token,
            message,
            error_kind,
            location,
        } = validate(sql, self.rules)
        {
            let mut diag = Diagnostic::new(
                DiagnosticKind::SqlSyntaxError,
                format!(
                    "SQL syntax error ({}) near '{}': {}",
                    error_kind, raw_token, message
                ),
            );
            if let Some(span) = location {
                diag = diag.with_span(span);
            }
            diagnostics.push(diag);
        }

        if let Some(actual) = known_actual {
            let diff = compare(&extract_referenced(sql), actual);

            for name in &diff.missing {
                let mut diag = Diagnostic::new(
                    DiagnosticKind::MissingBindVar,
                    format!("Bind variable '{}' is used in the SQL but not supplied", name),
                );
                if let Some(suggestion) = find_similar(name, &diff.unexpected) {
                    diag = diag.with_help(format!("Did you mean '{}'?", suggestion));
                }
                diagnostics.push(diag);
            }

            for name in &diff.unexpected {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnexpectedBindVar,
                        format!("Bind variable '{}' is supplied but not used in the SQL", name),
                    )
                    .with_help("Remove it from the bind variables or reference it in the SQL"),
                );
            }
        }

        diagnostics
    }

    /// Infer the row shape a call returns
    pub fn infer_return_shape(&self, sql: &str) -> ShapeInferenceResult {
        if sql.is_empty() {
            return ShapeInferenceResult::Unknown;
        }
        infer_shape(sql, self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_empty_sql_is_inert() {
        let rules = Rules::default();
        let analyzer = SqlAnalyzer::new(&rules);
        let supplied = BindVarSet::from_keys(["uid"]);
        assert!(analyzer.analyze_call_bind_vars("", Some(&supplied)).is_empty());
        assert_eq!(analyzer.infer_return_shape(""), ShapeInferenceResult::Unknown);
    }

    #[test]
    fn test_missing_bind_var() {
        let rules = Rules::default();
        let analyzer = SqlAnalyzer::new(&rules);
        let supplied = BindVarSet::from_keys(["uid"]);

        let diagnostics = analyzer.analyze_call_bind_vars(
            "SELECT * FROM t WHERE uid = :uid AND name = :name",
            Some(&supplied),
        );
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MissingBindVar]);
        assert!(diagnostics[0].message.contains(":name"));
    }

    #[test]
    fn test_unknown_bind_vars_skip_comparison() {
        let rules = Rules::default();
        let analyzer = SqlAnalyzer::new(&rules);

        let diagnostics = analyzer.analyze_call_bind_vars("SELECT a FROM t WHERE b = :b", None);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_misspelled_bind_var_gets_suggestion() {
        let rules = Rules::default();
        let analyzer = SqlAnalyzer::new(&rules);
        let supplied = BindVarSet::from_keys(["userid"]);

        let diagnostics =
            analyzer.analyze_call_bind_vars("SELECT a FROM t WHERE b = :user_id", Some(&supplied));
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::MissingBindVar, DiagnosticKind::UnexpectedBindVar]
        );
        assert_eq!(diagnostics[0].help.as_deref(), Some("Did you mean ':userid'?"));
    }

    #[test]
    fn test_syntax_error_reported_alongside_bind_vars() {
        let rules = Rules::default();
        let analyzer = SqlAnalyzer::new(&rules);
        let supplied = BindVarSet::from_keys(["a", "b"]);

        let diagnostics =
            analyzer.analyze_call_bind_vars("SELECT a FROM t t2 t3 WHERE a = :a", Some(&supplied));
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::SqlSyntaxError, DiagnosticKind::UnexpectedBindVar]
        );
        assert!(diagnostics[0].span.is_some());
    }
}
