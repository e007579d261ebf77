//! JSON sink

use super::traits::{OutputResult, OutputSink};
use crate::correlate::Correlation;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const PRODUCTS_FILE: &str = "products.json";
pub const FEATURES_FILE: &str = "features.json";

/// Writes pretty-printed JSON files into a directory
#[derive(Debug, Clone)]
pub struct JsonSink {
    directory: PathBuf,
}

impl JsonSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn write_file<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> OutputResult<()> {
        let mut writer = BufWriter::new(File::create(self.directory.join(file))?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl OutputSink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&self, result: &Correlation) -> OutputResult<()> {
        std::fs::create_dir_all(&self.directory)?;

        self.write_file(PRODUCTS_FILE, &result.products)?;
        self.write_file(FEATURES_FILE, &result.features)?;

        tracing::info!(
            "Wrote {} products and {} features to {}",
            result.products.len(),
            result.features.len(),
            self.directory.display()
        );
        Ok(())
    }
}
