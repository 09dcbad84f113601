//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqlbind_core::{AnalyzerConfig, Rules, SqlDialect};
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

/// Configuration for sqlbind
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// SQL file patterns to check
    #[serde(default)]
    pub files: Vec<String>,

    /// Approximating grammar (generic, postgresql, mysql)
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format (human, json, sarif)
    #[serde(default)]
    pub format: Option<String>,

    /// Rules to disable (e.g., ["E0002", "sql-syntax-error"])
    #[serde(default)]
    pub disable: Vec<String>,

    /// Suppression lists
    #[serde(default)]
    pub rules: AnalyzerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let config: Config = toml::from_str(&contents).into_diagnostic()?;
        Ok(config)
    }

    /// Try to find and load sqlbind.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join("sqlbind.toml");
            if config_path.exists() {
                tracing::info!(path = %config_path.display(), "loaded configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Load the given file, or discover one, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::find_and_load()?.unwrap_or_default()),
        }
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        dialect: &Option<String>,
        format: &Option<OutputFormat>,
        disable: &[String],
    ) -> Self {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if dialect.is_some() {
            self.dialect = dialect.clone();
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        if !disable.is_empty() {
            self.disable = disable.to_vec();
        }

        self
    }

    pub fn dialect(&self) -> Result<SqlDialect> {
        match &self.dialect {
            Some(name) => name.parse().map_err(|e: String| miette::miette!(e)),
            None => Ok(SqlDialect::default()),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            Some("sarif") => OutputFormat::Sarif,
            _ => OutputFormat::Human,
        }
    }

    /// Compile the configured suppression lists
    pub fn compile_rules(&self) -> Result<Rules> {
        Rules::from_config(&self.rules, self.dialect()?).into_diagnostic()
    }
}
