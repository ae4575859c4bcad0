//! Configuration file handling.
//!
//! Settings come from `.supply_risk.toml` (or `--config FILE`) and are then
//! overridden by command-line flags.

use crate::cli::Args;
use crate::error::ConfigError;
use crate::types::{CategorySet, CountryFilter, LogisticsScore};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".supply_risk.toml";

/// Logistics performance scores used when the config file has none.
static DEFAULT_LOGISTICS: Lazy<Vec<LogisticsScore>> = Lazy::new(|| {
    [
        ("Singapore", 4.3),
        ("Germany", 4.1),
        ("Netherlands", 4.1),
        ("Canada", 3.9),
        ("Japan", 3.9),
        ("USA", 3.8),
        ("South Korea", 3.8),
        ("China", 3.7),
        ("India", 3.4),
        ("Vietnam", 3.3),
        ("Mexico", 2.9),
    ]
    .into_iter()
    .map(|(country, score)| LogisticsScore {
        country: country.to_string(),
        score,
        label: score_label(score).to_string(),
    })
    .collect()
});

fn score_label(score: f64) -> &'static str {
    if score >= 4.0 {
        "Very High"
    } else if score >= 3.5 {
        "High"
    } else if score >= 3.0 {
        "Moderate"
    } else {
        "Low"
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Logistics performance lookup used to rank alternative sources.
    #[serde(default = "default_logistics")]
    pub logistics: Vec<LogisticsScore>,

    /// Spend multipliers per year for the flow trend chart.
    #[serde(default = "default_trend")]
    pub trend: Vec<TrendEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
            logistics: default_logistics(),
            trend: default_trend(),
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Categories treated as critical supply.
    #[serde(default = "default_critical_categories")]
    pub critical_categories: Vec<String>,

    /// Dominant domestic supplier country, subject to the tariff scenario.
    #[serde(default = "default_origin_country")]
    pub origin_country: String,

    #[serde(default = "default_tariff_rate")]
    pub tariff_rate: f64,

    /// Countries considered as alternative sources. Empty means every
    /// country other than the origin.
    #[serde(default)]
    pub target_countries: Vec<String>,

    #[serde(default = "default_top_n")]
    pub top_countries: usize,

    #[serde(default = "default_top_n")]
    pub top_vendors: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            critical_categories: default_critical_categories(),
            origin_country: default_origin_country(),
            tariff_rate: default_tariff_rate(),
            target_countries: Vec::new(),
            top_countries: default_top_n(),
            top_vendors: default_top_n(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Rows shown per table in the console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            preview_rows: default_preview_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub year: i32,
    pub multiplier: f64,
}

fn default_critical_categories() -> Vec<String> {
    vec!["Switchgear", "Transformers", "Generators", "Circuit Breakers", "Batteries"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_origin_country() -> String {
    "USA".to_string()
}

fn default_tariff_rate() -> f64 {
    0.25
}

fn default_top_n() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_preview_rows() -> usize {
    3
}

fn default_logistics() -> Vec<LogisticsScore> {
    DEFAULT_LOGISTICS.clone()
}

fn default_trend() -> Vec<TrendEntry> {
    [(2021, 0.82), (2022, 0.90), (2023, 0.96), (2024, 1.0)]
        .into_iter()
        .map(|(year, multiplier)| TrendEntry { year, multiplier })
        .collect()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit path first, then `.supply_risk.toml` in the working
    /// directory, then built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = path {
            info!("Loading config from {}", p.display());
            return Self::load(p);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            info!("Found {} in working directory", DEFAULT_CONFIG_FILE);
            return Self::load(local);
        }
        debug!("No config file, using defaults");
        Ok(Self::default())
    }

    /// Merge command-line arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(rate) = args.tariff_rate {
            self.pipeline.tariff_rate = rate;
        }
        if let Some(ref origin) = args.origin {
            self.pipeline.origin_country = origin.clone();
        }
        if let Some(ref categories) = args.categories {
            self.pipeline.critical_categories = categories.clone();
        }
        if let Some(ref dir) = args.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(rows) = args.preview_rows {
            self.output.preview_rows = rows;
        }
    }

    /// Check values that serde cannot, returning the validated category set.
    pub fn validate(&self) -> Result<CategorySet, ConfigError> {
        let rate = self.pipeline.tariff_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::TariffRate(rate));
        }
        if self.pipeline.origin_country.trim().is_empty() {
            return Err(ConfigError::BlankOrigin);
        }
        CategorySet::new(&self.pipeline.critical_categories)
    }

    /// Filter for the alternative-sourcing breakdown.
    pub fn alternative_filter(&self) -> CountryFilter {
        let origin = self.pipeline.origin_country.trim();
        if self.pipeline.target_countries.is_empty() {
            CountryFilter::exclude([origin])
        } else {
            CountryFilter::only(
                self.pipeline
                    .target_countries
                    .iter()
                    .filter(|c| c.trim() != origin),
            )
        }
    }

    pub fn trend_multipliers(&self) -> Vec<(i32, f64)> {
        self.trend.iter().map(|t| (t.year, t.multiplier)).collect()
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Config::default())
    }
}
