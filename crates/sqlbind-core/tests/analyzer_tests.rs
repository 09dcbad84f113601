// Integration tests for SQL call-site analysis
use pretty_assertions::assert_eq;
use sqlbind_core::bind_vars::{compare, extract_referenced};
use sqlbind_core::error::{DiagnosticKind, Severity};
use sqlbind_core::normalize::strip_templates;
use sqlbind_core::shape::{ColumnShape, ShapeInferenceResult, MIXED};
use sqlbind_core::syntax::{validate, ParseOutcome, SuppressReason};
use sqlbind_core::{
    AnalyzerConfig, BindVarSet, HostArgument, Registry, Rules, SqlAnalyzer, SqlDialect,
};

fn setup_rules() -> Rules {
    Rules::default()
}

#[test]
fn test_bind_var_case_is_ignored() {
    let expected = extract_referenced("SELECT a FROM t WHERE uid = :Uid");
    let actual = BindVarSet::from_keys([":uid"]);
    let diff = compare(&expected, &actual);
    assert!(diff.is_empty(), "{:?}", diff);

    let expected = extract_referenced("SELECT a FROM t WHERE uid = :UID");
    let actual = BindVarSet::from_keys(["uid"]);
    assert!(compare(&expected, &actual).is_empty());
}

#[test]
fn test_compare_roles_swap() {
    let a = extract_referenced("UPDATE t SET x = :x, y = :y WHERE id = :id");
    let b = BindVarSet::from_keys(["ID", "z"]);
    let ab = compare(&a, &b);
    let ba = compare(&b, &a);
    assert_eq!(ab.missing, ba.unexpected);
    assert_eq!(ab.unexpected, ba.missing);
    assert_eq!(compare(&a, &a).missing.len(), 0);
    assert_eq!(compare(&a, &a).unexpected.len(), 0);
}

#[test]
fn test_strip_templates_idempotent() {
    let sql = "SELECT {{PK}}, TO_CHAR(d, 'YYYY-MM-DD HH24:MI') FROM {{TK}} WHERE a = :a";
    let once = strip_templates(sql);
    assert_eq!(strip_templates(&once), once);
}

#[test]
fn test_validate_outcomes() {
    let rules = setup_rules();

    assert_eq!(validate("SELECT 1 FROM dual", &rules), ParseOutcome::Valid);

    match validate("SELECT foo bar FROM", &rules) {
        ParseOutcome::SyntaxError { raw_token, message, .. } => {
            assert!(!raw_token.is_empty());
            assert!(!message.is_empty());
        }
        other => panic!("expected syntax error, got {:?}", other),
    }

    assert_eq!(
        validate("BEGIN update_stats(); END;", &rules),
        ParseOutcome::Suppressed {
            reason: SuppressReason::UnsupportedConstruct
        }
    );
}

#[test]
fn test_infer_shape_of_select() {
    let rules = setup_rules();
    let analyzer = SqlAnalyzer::new(&rules);

    let mut expected = ColumnShape::new();
    expected.insert("bar", MIXED);
    expected.insert("other", MIXED);
    expected.insert("cnt", MIXED);
    assert_eq!(
        analyzer.infer_return_shape(
            "SELECT foo as bar, other, COUNT(*) cnt FROM sometable WHERE uid = :uid"
        ),
        ShapeInferenceResult::Shape(expected)
    );
}

#[test]
fn test_infer_shape_unknown_cases() {
    let rules = setup_rules();
    let analyzer = SqlAnalyzer::new(&rules);

    assert_eq!(
        analyzer.infer_return_shape("SELECT * FROM sometable"),
        ShapeInferenceResult::Unknown
    );
    assert_eq!(
        analyzer.infer_return_shape("SELECT a FROM t1; SELECT b FROM t2"),
        ShapeInferenceResult::Unknown
    );
    assert_eq!(
        analyzer.infer_return_shape("DELETE FROM t WHERE id = :id"),
        ShapeInferenceResult::Unknown
    );
}

#[test]
fn test_missing_bind_var_end_to_end() {
    let rules = setup_rules();
    let analyzer = SqlAnalyzer::new(&rules);
    let actual = BindVarSet::from_keys(["uid"]);

    let diagnostics = analyzer.analyze_call_bind_vars(
        "SELECT * FROM t WHERE uid = :uid AND name = :name",
        Some(&actual),
    );
    let missing: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::MissingBindVar)
        .collect();
    let unexpected = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnexpectedBindVar)
        .count();

    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains(":name"));
    assert_eq!(missing[0].severity, Severity::Error);
    assert_eq!(unexpected, 0);
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_string_literal_colons_are_not_bind_vars() {
    let rules = setup_rules();
    let analyzer = SqlAnalyzer::new(&rules);
    let actual = BindVarSet::new();

    let diagnostics = analyzer.analyze_call_bind_vars(
        "SELECT TO_CHAR(created, 'HH24:MI:SS') FROM {{TK}}events",
        Some(&actual),
    );
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn test_configured_rules_replace_defaults() {
    let config = AnalyzerConfig {
        give_up_patterns: vec![],
        suppressed_tokens: vec![],
        gap_patterns: vec![],
        misparsed_aliases: vec!["total".into()],
    };
    let rules = Rules::from_config(&config, SqlDialect::PostgreSQL).unwrap();
    let analyzer = SqlAnalyzer::new(&rules);

    assert_eq!(
        analyzer.infer_return_shape("SELECT SUM(x) AS Total FROM t"),
        ShapeInferenceResult::Unknown
    );
    let diagnostics = analyzer.analyze_call_bind_vars("BEGIN update_stats(); END;", None);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::SqlSyntaxError);
}

#[test]
fn test_registry_end_to_end() {
    let registry = Registry::default();
    let call_analyzers = registry.call_argument_analyzers();
    let args = vec![
        HostArgument {
            literal: Some("SELECT id FROM users WHERE id = :id AND org = :org".into()),
            keys: None,
        },
        HostArgument {
            literal: None,
            keys: Some(vec!["id".into(), "ORG".into()]),
        },
    ];

    assert!(call_analyzers["execSql"].analyze(&args).is_empty());

    let shape = registry.return_type_analyzers()["execSql"].infer(&args);
    assert_eq!(shape.shape().map(|s| s.len()), Some(1));
}
