//! CLI argument definitions for the pool quoting tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "poolquote",
    version,
    about = "Pool construction quoting - price a project from its catalog selections",
    long_about = "Price a pool construction project from its catalog selections.\n\n\
                  Loads a cost component catalog (CSV or JSON), aggregates the\n\
                  project's selections into per-category subtotals, and prints the\n\
                  cost, margin, and recommended retail price."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Price a project file against a catalog.
    Quote(QuoteArgs),

    /// List component categories, units, and their persistence targets.
    Categories,
}

#[derive(Parser)]
pub struct QuoteArgs {
    /// Path to the project JSON file (selections and margin percentage).
    #[arg(value_name = "PROJECT_FILE")]
    pub project_file: PathBuf,

    /// Path to the cost component catalog (.csv or .json).
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: PathBuf,

    /// Emit the aggregated quote as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
