//! Output module for persisting correlation results
//!
//! This module handles:
//! - CSV files, and the raw crawl snapshot read by a run without crawling
//! - JSON files
//! - The SQLite export database
//! - Terminal display

mod csv_output;
mod display;
mod json_output;
mod schema;
mod sqlite_output;
mod traits;

pub use csv_output::{write_tables, CsvSink, FeatureRecord, FEATURES_FILE, PRODUCTS_FILE};
pub use display::{format_correlation, print_correlation};
pub use json_output::JsonSink;
pub use schema::initialize_schema;
pub use sqlite_output::SqliteSink;
pub use traits::{OutputError, OutputResult, OutputSink};

use crate::config::OutputConfig;
use std::fmt;
use std::str::FromStr;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Db,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "db" | "sqlite" => Ok(Self::Db),
            other => Err(format!(
                "unknown output format '{}' (expected csv, json or db)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Db => write!(f, "db"),
        }
    }
}

/// Creates the sink for `format`
///
/// # Arguments
///
/// * `format` - The selected format
/// * `config` - Output locations
/// * `config_hash` - Configuration hash recorded by the database sink
pub fn sink_for(
    format: OutputFormat,
    config: &OutputConfig,
    config_hash: &str,
) -> Box<dyn OutputSink> {
    match format {
        OutputFormat::Csv => Box::new(CsvSink::new(&config.directory)),
        OutputFormat::Json => Box::new(JsonSink::new(&config.directory)),
        OutputFormat::Db => Box::new(SqliteSink::new(&config.database_path, config_hash)),
    }
}
