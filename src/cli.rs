//! Command line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gradify",
    version,
    about = "Analyze a spreadsheet of student grades and export summary tables and charts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Explicit log level (RUST_LOG is used when absent).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive tables and charts from a grade spreadsheet.
    Analyze(AnalyzeArgs),

    /// Print the header row of a spreadsheet.
    Headers {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Spreadsheet with a header row (xlsx, xls, ods or csv).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Grade columns, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub grades: Vec<String>,

    /// Test-score columns paired with the grade columns, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub tests: Vec<String>,

    /// Column holding subject names (row numbers are used when missing).
    #[arg(long = "names-column", default_value = "")]
    pub names_column: String,

    /// JSON file with scale, rounding and label settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory.
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,

    /// Write the conclusion workbook.
    #[arg(long)]
    pub tables: bool,

    /// Write all charts.
    #[arg(long)]
    pub charts: bool,

    /// Free-text column for the study aid chart (terms come from the config catalog).
    #[arg(long = "benefits-column")]
    pub benefits_column: Option<String>,

    /// Skip writing a copy of the input table next to the conclusion.
    #[arg(long = "no-original")]
    pub no_original: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
