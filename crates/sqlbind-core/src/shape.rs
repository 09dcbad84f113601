//! Result-shape inference for SELECT statements
//!
//! Only column names are inferred. Any doubt about a single column makes the
//! whole result unknown, since a partial shape would be taken as complete.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlparser::ast::{Expr, SelectItem, SetExpr, Statement};
use sqlparser::parser::Parser;

use crate::config::Rules;
use crate::normalize::normalize_for_parser;

/// Placeholder value type of an inferred column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Unknown or mixed
    Mixed,
}

/// The type every inferred column gets
pub const MIXED: ColumnType = ColumnType::Mixed;

/// Ordered mapping of lowercase column alias to value type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnShape {
    columns: IndexMap<String, ColumnType>,
}

impl ColumnShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column; a duplicate alias keeps its position and takes the new type
    pub fn insert(&mut self, alias: impl Into<String>, ty: ColumnType) {
        self.columns.insert(alias.into(), ty);
    }

    pub fn get(&self, alias: &str) -> Option<ColumnType> {
        self.columns.get(alias).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Outcome of shape inference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "columns", rename_all = "lowercase")]
pub enum ShapeInferenceResult {
    #[default]
    Unknown,
    Shape(ColumnShape),
}

impl ShapeInferenceResult {
    pub fn shape(&self) -> Option<&ColumnShape> {
        match self {
            ShapeInferenceResult::Shape(shape) => Some(shape),
            ShapeInferenceResult::Unknown => None,
        }
    }
}

/// Infer the row shape of a single SELECT statement
pub fn infer_shape(sql: &str, rules: &Rules) -> ShapeInferenceResult {
    let normalized = normalize_for_parser(sql);
    let dialect = rules.dialect().parser_dialect();
    let statements = match Parser::parse_sql(dialect.as_ref(), &normalized) {
        Ok(stmts) => stmts,
        Err(e) => {
            tracing::debug!(error = %e, "shape inference skipped: parse failed");
            return ShapeInferenceResult::Unknown;
        }
    };

    let [Statement::Query(query)] = statements.as_slice() else {
        tracing::debug!(
            statements = statements.len(),
            "shape inference skipped: not a single query"
        );
        return ShapeInferenceResult::Unknown;
    };
    let SetExpr::Select(select) = query.body.as_ref() else {
        return ShapeInferenceResult::Unknown;
    };

    let mut shape = ColumnShape::new();
    for item in &select.projection {
        let alias = select_item_alias(item);
        if alias.is_empty() || alias == "*" || rules.is_misparsed_alias(&alias) {
            tracing::debug!(alias = %alias, "shape inference skipped: unusable column");
            return ShapeInferenceResult::Unknown;
        }
        shape.insert(alias, MIXED);
    }

    ShapeInferenceResult::Shape(shape)
}

/// Derive the output column name of a projection item, lowercased
fn select_item_alias(item: &SelectItem) -> String {
    let alias = match item {
        SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
        SelectItem::UnnamedExpr(Expr::Identifier(ident)) => ident.value.clone(),
        SelectItem::UnnamedExpr(Expr::CompoundIdentifier(idents)) => idents
            .last()
            .map(|col| col.value.clone())
            .unwrap_or_default(),
        SelectItem::UnnamedExpr(expr) => expr.to_string(),
        SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => "*".to_string(),
    };
    strip_redundant_parens(&alias.to_lowercase()).to_string()
}

/// `(a)` becomes `a`; anything with nested or unbalanced parentheses is kept
fn strip_redundant_parens(alias: &str) -> &str {
    match alias
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) if !inner.contains(['(', ')']) => inner,
        _ => alias,
    }
}
