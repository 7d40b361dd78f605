// src/storage/mod.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::batch::FileResult;
use crate::utils::error::StorageError;

/// One output row. Column names are part of the output contract.
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    filename: &'a str,
    #[serde(rename = "EPS")]
    eps: String,
    #[serde(rename = "EPS_Term")]
    eps_term: &'a str,
}

pub struct StorageManager {
    output_file: PathBuf,
}

impl StorageManager {
    /// Creates a StorageManager writing to `output_file`, creating its parent directory
    pub fn new<P: AsRef<Path>>(output_file: P) -> Result<Self, StorageError> {
        let output_file = output_file.as_ref().to_path_buf();

        if let Some(parent) = output_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }
        }

        Ok(Self { output_file })
    }

    /// Writes one CSV row per processed file
    pub fn save_results(&self, results: &[FileResult]) -> Result<PathBuf, StorageError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.output_file)?;

        // Written explicitly so an empty batch still gets a header row
        writer.write_record(["filename", "EPS", "EPS_Term"])?;
        for result in results {
            writer.serialize(ResultRecord {
                filename: &result.filename,
                eps: result.extraction.value_label(),
                eps_term: result.extraction.term_label(),
            })?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Results written to {}", self.output_file.display());
        Ok(self.output_file.clone())
    }

    /// Saves run statistics next to the results in JSON format
    pub fn save_run_metadata(&self, input_dir: &Path, results: &[FileResult]) -> Result<PathBuf, StorageError> {
        let file_path = PathBuf::from(format!("{}.meta.json", self.output_file.display()));

        let mut by_strategy: BTreeMap<&str, usize> = BTreeMap::new();
        for result in results {
            if let Some(strategy) = result.extraction.strategy {
                *by_strategy.entry(strategy).or_default() += 1;
            }
        }
        let extracted = results.iter().filter(|r| r.extraction.is_found()).count();
        let failed = results.iter().filter(|r| r.failed).count();

        let metadata = serde_json::json!({
            "input_dir": input_dir.display().to_string(),
            "output_file": self.output_file.display().to_string(),
            "documents": results.len(),
            "extracted": extracted,
            "missing": results.len() - extracted,
            "failed": failed,
            "by_strategy": by_strategy,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}
