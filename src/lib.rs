//! Catalog-Harvest: a crawl-and-correlate pipeline for paginated shop catalogs
//!
//! This crate crawls a paginated e-commerce catalog, collects the site's filter
//! tags ("features") and their product listings, expands multi-variant products
//! into one row per purchasable option, and joins features with products into a
//! filtered, sorted result set that can be written to CSV, JSON or SQLite.
//! Crops from a public gardening API can be merged into the tables as well.

pub mod catalog;
pub mod config;
pub mod correlate;
pub mod crawler;
pub mod input;
pub mod output;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{url} could not be fetched")]
    Unavailable { url: String },

    #[error("Input file {path} was not found")]
    MissingInput { path: String },

    #[error("Failed to read input file {path}: {message}")]
    InputFormat { path: String, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Process exit status for this error
    ///
    /// Missing local input is the one distinct fatal condition of the pipeline.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingInput { .. } => 4,
            _ => 1,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' for {field}")]
    InvalidSelector { field: &'static str, selector: String },
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Feature, FeatureProductLink, FeatureTable, Product, ProductKey, ProductTable};
pub use config::Config;
pub use correlate::{correlate, Correlation, Query};
pub use crawler::{harvest, Harvest};
