//! Registration table for the analyzed call sites
//!
//! The host locates calls and resolves their arguments; this module maps
//! each known function to the analyzers that consume those arguments.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::Rules;
#[cfg(feature = "sql-parser")]
use crate::{
    analyzer::SqlAnalyzer, bind_vars::BindVarSet, error::Diagnostic,
    shape::ShapeInferenceResult,
};

/// Where a function takes its SQL text and bind variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSiteSpec {
    pub function: &'static str,
    pub sql_arg: usize,
    pub bind_vars_arg: usize,
}

/// The functions checked by default
pub const DEFAULT_CALL_SITES: &[CallSiteSpec] = &[
    CallSiteSpec {
        function: "execSql",
        sql_arg: 0,
        bind_vars_arg: 1,
    },
    CallSiteSpec {
        function: "execLimitSql",
        sql_arg: 0,
        bind_vars_arg: 3,
    },
    CallSiteSpec {
        function: "getSelectRows",
        sql_arg: 0,
        bind_vars_arg: 1,
    },
];

/// What the host resolved statically for one call argument
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostArgument {
    /// Literal string value, when determinable
    #[serde(default)]
    pub literal: Option<String>,
    /// Keys of a fully known array shape; `None` when the shape is mixed
    #[serde(default)]
    pub keys: Option<Vec<String>>,
}

/// Bind variable and syntax checks for one function
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "sql-parser"), allow(dead_code))]
pub struct CallArgumentAnalyzer {
    site: CallSiteSpec,
    rules: Arc<Rules>,
}

/// Return shape override for one function
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "sql-parser"), allow(dead_code))]
pub struct ReturnTypeAnalyzer {
    site: CallSiteSpec,
    rules: Arc<Rules>,
}

#[cfg(feature = "sql-parser")]
impl CallArgumentAnalyzer {
    pub fn site(&self) -> &CallSiteSpec {
        &self.site
    }

    pub fn analyze(&self, args: &[HostArgument]) -> Vec<Diagnostic> {
        let Some(sql) = literal_arg(args, self.site.sql_arg) else {
            return Vec::new();
        };
        let supplied = args
            .get(self.site.bind_vars_arg)
            .and_then(|arg| arg.keys.as_ref())
            .map(BindVarSet::from_keys);

        SqlAnalyzer::new(&self.rules).analyze_call_bind_vars(sql, supplied.as_ref())
    }
}

#[cfg(feature = "sql-parser")]
impl ReturnTypeAnalyzer {
    pub fn site(&self) -> &CallSiteSpec {
        &self.site
    }

    pub fn infer(&self, args: &[HostArgument]) -> ShapeInferenceResult {
        match literal_arg(args, self.site.sql_arg) {
            Some(sql) => SqlAnalyzer::new(&self.rules).infer_return_shape(sql),
            None => ShapeInferenceResult::Unknown,
        }
    }
}

#[cfg(feature = "sql-parser")]
fn literal_arg(args: &[HostArgument], index: usize) -> Option<&str> {
    args.get(index)?.literal.as_deref()
}

/// Builds the per-function analyzer maps handed to the host
#[derive(Debug, Clone)]
pub struct Registry {
    sites: Vec<CallSiteSpec>,
    rules: Arc<Rules>,
}

impl Registry {
    pub fn new(rules: Rules) -> Self {
        Self::with_sites(rules, DEFAULT_CALL_SITES.to_vec())
    }

    pub fn with_sites(rules: Rules, sites: Vec<CallSiteSpec>) -> Self {
        Self {
            sites,
            rules: Arc::new(rules),
        }
    }

    pub fn sites(&self) -> &[CallSiteSpec] {
        &self.sites
    }

    /// Function name to bind variable/syntax analyzer; empty without a SQL grammar
    pub fn call_argument_analyzers(&self) -> IndexMap<&'static str, CallArgumentAnalyzer> {
        if !parser_available() {
            return IndexMap::new();
        }
        self.sites
            .iter()
            .map(|site| {
                let analyzer = CallArgumentAnalyzer {
                    site: *site,
                    rules: Arc::clone(&self.rules),
                };
                (site.function, analyzer)
            })
            .collect()
    }

    /// Function name to return shape analyzer; empty without a SQL grammar
    pub fn return_type_analyzers(&self) -> IndexMap<&'static str, ReturnTypeAnalyzer> {
        if !parser_available() {
            return IndexMap::new();
        }
        self.sites
            .iter()
            .map(|site| {
                let analyzer = ReturnTypeAnalyzer {
                    site: *site,
                    rules: Arc::clone(&self.rules),
                };
                (site.function, analyzer)
            })
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

#[cfg(feature = "sql-parser")]
fn parser_available() -> bool {
    true
}

#[cfg(not(feature = "sql-parser"))]
fn parser_available() -> bool {
    static REPORTED: std::sync::Once = std::sync::Once::new();
    REPORTED.call_once(|| {
        tracing::error!(
            "sqlbind-core was built without the `sql-parser` feature; SQL call-site checks are disabled"
        );
    });
    false
}
