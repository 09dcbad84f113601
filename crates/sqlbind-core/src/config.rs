//! Rule lists for false-positive suppression
//!
//! The grammar only approximates the target dialect, so the lists here are
//! data rather than fixed truth: every one of them can be replaced from
//! configuration.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dialect::SqlDialect;
use crate::error::ConfigError;

/// Raw SQL matching any of these is never parsed: procedural blocks,
/// `RETURNING` clauses and empty windowing calls.
pub const DEFAULT_GIVE_UP_PATTERNS: &[&str] = &[
    r"(?i)^\s*(BEGIN|DECLARE)\b",
    r"(?i)\bRETURNING\b",
    r"(?i)\bOVER\s*\(\s*\)",
];

/// Dialect keywords the grammar does not know. A syntax error is dropped when
/// one of them is the offending token or the word right before it, since the
/// grammar often swallows the keyword as an alias and fails on what follows.
pub const DEFAULT_SUPPRESSED_TOKENS: &[&str] = &["MINUS", "KEEP"];

/// Regexes matched against normalized SQL once parsing has failed, for dialect
/// constructs whose failure surfaces far from the keyword (usually at EOF).
pub const DEFAULT_GAP_PATTERNS: &[&str] = &[r"(?i)\bCONNECT\s+BY\b"];

/// Aliases that only appear when the grammar mis-tokenizes syntax as a column name
pub const DEFAULT_MISPARSED_ALIASES: &[&str] = &[
    "keep",
    "over",
    "within",
    "partition",
    "dense_rank",
    "trunc",
];

/// Serializable rule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Regexes matched against raw SQL; a match skips the syntax check
    pub give_up_patterns: Vec<String>,
    /// Offending tokens (case-insensitive) whose syntax errors are dropped
    pub suppressed_tokens: Vec<String>,
    /// Regexes matched against normalized SQL; a match drops a syntax error
    pub gap_patterns: Vec<String>,
    /// Column aliases (case-insensitive) that make shape inference give up
    pub misparsed_aliases: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            give_up_patterns: to_strings(DEFAULT_GIVE_UP_PATTERNS),
            suppressed_tokens: to_strings(DEFAULT_SUPPRESSED_TOKENS),
            gap_patterns: to_strings(DEFAULT_GAP_PATTERNS),
            misparsed_aliases: to_strings(DEFAULT_MISPARSED_ALIASES),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Compiled rules shared by every analysis
#[derive(Debug, Clone)]
pub struct Rules {
    dialect: SqlDialect,
    give_up: Vec<Regex>,
    gaps: Vec<Regex>,
    suppressed_tokens: HashSet<String>,
    misparsed_aliases: HashSet<String>,
}

impl Rules {
    pub fn from_config(config: &AnalyzerConfig, dialect: SqlDialect) -> Result<Self, ConfigError> {
        let give_up = compile_patterns(&config.give_up_patterns)?;
        let gaps = compile_patterns(&config.gap_patterns)?;

        Ok(Self {
            dialect,
            give_up,
            gaps,
            suppressed_tokens: config
                .suppressed_tokens
                .iter()
                .map(|t| t.to_uppercase())
                .collect(),
            misparsed_aliases: config
                .misparsed_aliases
                .iter()
                .map(|a| a.to_lowercase())
                .collect(),
        })
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Whether raw SQL contains a construct the grammar cannot handle at all
    pub fn gives_up_on(&self, raw_sql: &str) -> bool {
        self.give_up.iter().any(|re| re.is_match(raw_sql))
    }

    /// Whether normalized SQL that failed to parse uses a known dialect construct
    pub fn is_approximation_gap(&self, normalized_sql: &str) -> bool {
        self.gaps.iter().any(|re| re.is_match(normalized_sql))
    }

    /// `token` must already be uppercased
    pub fn is_suppressed_token(&self, token: &str) -> bool {
        self.suppressed_tokens.contains(token)
    }

    /// `alias` must already be lowercased
    pub fn is_misparsed_alias(&self, alias: &str) -> bool {
        self.misparsed_aliases.contains(alias)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

impl Default for Rules {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default(), SqlDialect::default())
            .expect("invalid built-in rule pattern")
    }
}
