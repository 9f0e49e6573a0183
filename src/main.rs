//! Gradify - Spreadsheet Grade Analysis & Chart Export
//!
//! Command line front end over the `gradify` library.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{AnalyzeArgs, Cli, Command, LogFormatArg, LogLevelArg};
use gradify::grades::default_chart_files;
use gradify::logging::{init_logging, LogConfig, LogFormat};
use gradify::{GradeTableProcessor, ProcessorConfig};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

const CONCLUSION_FILE: &str = "Conclusion.xlsx";
const ORIGINAL_FILE: &str = "original.xlsx";
/// Position of the study aid chart in the default chart file list.
const BENEFITS_CHART_INDEX: usize = 2;

fn main() {
    let cli = Cli::parse();

    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Headers { input } => GradeTableProcessor::read_headers(&input)
            .map(|headers| {
                for header in headers {
                    println!("{header}");
                }
            })
            .with_context(|| format!("failed to read headers of {}", input.display())),
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        use_env_filter: cli.log_level.is_none(),
        with_ansi: io::stderr().is_terminal(),
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ProcessorConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    let processor = GradeTableProcessor::open(
        &args.input,
        &args.grades,
        &args.tests,
        &args.names_column,
        config,
    )
    .with_context(|| format!("failed to process {}", args.input.display()))?;

    if args.tables {
        let original = (!args.no_original).then_some(ORIGINAL_FILE);
        processor
            .export_conclusion(&args.out_dir, CONCLUSION_FILE, original)
            .context("failed to export tables")?;
    }

    if args.charts {
        let mut files = default_chart_files();
        match &args.benefits_column {
            Some(column) => {
                let mut catalog = processor.config().benefits.clone();
                catalog.column = column.clone();
                processor
                    .export_charts(&args.out_dir, &files, &catalog)
                    .context("failed to export charts")?;
            }
            None => {
                files.remove(BENEFITS_CHART_INDEX);
                processor
                    .export_charts_without_benefits(&args.out_dir, &files)
                    .context("failed to export charts")?;
            }
        }
    }

    if !args.tables && !args.charts {
        let view = processor.grades_view(&processor.labels())?;
        println!("{view}");
    }

    Ok(())
}
