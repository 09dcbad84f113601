//! sqlbind-core: SQL call-site analysis library
//!
//! Checks the SQL text passed to "execute SQL" functions without a database
//! connection: bind variables referenced versus supplied, syntax against an
//! approximating grammar, and the column names a SELECT returns.

#[cfg(feature = "sql-parser")]
pub mod analyzer;
pub mod bind_vars;
pub mod config;
pub mod dialect;
pub mod error;
pub mod normalize;
pub mod registry;
#[cfg(feature = "sql-parser")]
pub mod shape;
#[cfg(feature = "sql-parser")]
pub mod syntax;

#[cfg(feature = "sql-parser")]
pub use analyzer::SqlAnalyzer;
pub use bind_vars::{BindVarDiff, BindVarName, BindVarSet};
pub use config::{AnalyzerConfig, Rules};
pub use dialect::SqlDialect;
pub use error::{
    ConfigError, Diagnostic, DiagnosticKind, ParseFailure, ParseFailureKind, Severity, Span,
};
pub use registry::{CallSiteSpec, HostArgument, Registry, DEFAULT_CALL_SITES};
#[cfg(feature = "sql-parser")]
pub use shape::{ColumnShape, ColumnType, ShapeInferenceResult};
#[cfg(feature = "sql-parser")]
pub use syntax::{ParseOutcome, SuppressReason};
