//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sqlbind")]
#[command(author, version, about = "Bind variable and syntax checker for SQL call sites")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to sqlbind.toml in this or a parent directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Approximating SQL grammar (generic, postgresql, mysql)
    #[arg(short, long, global = true)]
    pub dialect: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check SQL files, one statement per file (supports glob patterns)
    Check {
        /// SQL files to check
        files: Vec<PathBuf>,

        /// Bind variable supplied by the caller (repeatable)
        #[arg(short, long = "bind", value_name = "NAME")]
        binds: Vec<String>,

        /// The caller supplies no bind variables at all
        #[arg(long, conflicts_with = "binds")]
        no_bind_vars: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Rules to disable (codes like E0002 or names like unexpected-bind-var)
        #[arg(long, value_name = "RULE")]
        disable: Vec<String>,
    },

    /// Check a JSON dump of host call sites against the registered functions
    Calls {
        /// JSON file with an array of {function, location, args}
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Rules to disable (codes like E0002 or names like unexpected-bind-var)
        #[arg(long, value_name = "RULE")]
        disable: Vec<String>,
    },

    /// Print the column shape a SELECT returns
    Shape {
        /// SQL file with one statement
        file: PathBuf,
    },

    /// Normalize SQL and display AST (for debugging)
    Parse {
        /// SQL file to parse
        file: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
