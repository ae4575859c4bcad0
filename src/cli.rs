//! Command-line interface argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Supply-chain risk report for the vendor deck.
///
/// Loads a vendor CSV, runs the spend / lead-time / tariff / completeness
/// aggregations once, previews each table and exports CSV and JSON files.
///
/// Examples:
///   supply_risk_report vendors.csv
///   supply_risk_report vendors.csv --tariff-rate 0.1 --origin China
///   supply_risk_report vendors.csv --format json -o out/
///   supply_risk_report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Vendor CSV file to analyze
    #[arg(value_name = "FILE", default_value = "vendors.csv")]
    pub input: PathBuf,

    /// Path to configuration file
    ///
    /// If not specified, looks for .supply_risk.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for exported files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Which files to export
    #[arg(long, default_value = "all", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Rows shown per table in the console preview
    #[arg(long, value_name = "ROWS")]
    pub preview_rows: Option<usize>,

    /// Tariff rate applied to origin-country spend (0.0 - 1.0)
    #[arg(long, value_name = "RATE", env = "SUPPLY_RISK_TARIFF_RATE")]
    pub tariff_rate: Option<f64>,

    /// Country subject to the tariff scenario
    #[arg(long, value_name = "COUNTRY")]
    pub origin: Option<String>,

    /// Critical categories (comma-separated)
    ///
    /// Example: --categories Switchgear,Transformers
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a default .supply_risk.toml and exit
    #[arg(long)]
    pub init_config: bool,
}

/// Export selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// CSV table per section
    Csv,
    /// summary.json only
    Json,
    /// CSV tables and summary.json
    All,
}

impl OutputFormat {
    pub fn csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::All)
    }

    pub fn json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    /// `RUST_LOG` directives when set and valid, otherwise the level from
    /// `-v` / `-q`.
    pub fn log_filter(&self) -> EnvFilter {
        self.log_filter_from(std::env::var("RUST_LOG").ok().as_deref())
    }

    pub fn log_filter_from(&self, directives: Option<&str>) -> EnvFilter {
        directives
            .filter(|d| !d.trim().is_empty())
            .and_then(|d| EnvFilter::try_new(d).ok())
            .unwrap_or_else(|| EnvFilter::new(LevelFilter::from_level(self.log_level()).to_string()))
    }
}
