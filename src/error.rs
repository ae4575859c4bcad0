//! Error types for the loading and configuration layers.
//!
//! The aggregation pipeline itself is total and never returns an error;
//! everything here belongs to the surfaces around it.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read the vendor CSV.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open vendor file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("vendor file has no readable header row: {0}")]
    Header(#[source] csv::Error),
}

/// Invalid configuration values or an unreadable configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("critical category list is empty")]
    EmptyCategories,

    #[error("critical category names must not be blank")]
    BlankCategory,

    #[error("critical category '{0}' is listed more than once")]
    DuplicateCategory(String),

    #[error("tariff rate {0} is outside the range 0.0..=1.0")]
    TariffRate(f64),

    #[error("origin country must not be blank")]
    BlankOrigin,
}
