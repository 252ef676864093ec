//! Runtime configuration.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{HorizonError, Result};
use crate::input::{LocatorConfig, ParserConfig};
use crate::samples::default_urls;
use crate::training::TrainingOrchestrator;

/// Settings shared by the library facade, the CLI and the server.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Candidate header offsets scanned in an upload.
    pub max_scan_rows: usize,
    /// Rows parsed under a candidate header before accepting it.
    pub probe_rows: usize,
    /// Fixed delimiter; auto-detected when absent.
    pub delimiter: Option<char>,
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed of the train/test shuffle.
    pub seed: u64,
    /// Directory holding the pretrained `xgb_*_model.json` artifacts.
    pub model_dir: PathBuf,
    /// Sample dataset name -> download URL.
    pub sample_urls: IndexMap<String, String>,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            max_scan_rows: 300,
            probe_rows: 5,
            delimiter: None,
            test_fraction: 0.2,
            seed: 42,
            model_dir: PathBuf::from("models"),
            sample_urls: default_urls(),
        }
    }
}

impl HorizonConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| HorizonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HorizonConfig = serde_json::from_str(&text).map_err(|e| {
            HorizonError::Config(format!("Failed to parse config '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.max_scan_rows == 0 {
            return Err(HorizonError::Config("max_scan_rows must be at least 1".to_string()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(HorizonError::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(HorizonError::Config(format!("delimiter '{}' is not ASCII", d)));
            }
        }
        Ok(())
    }

    pub fn parser(&self) -> ParserConfig {
        ParserConfig {
            delimiter: self.delimiter.map(|d| d as u8),
            ..ParserConfig::default()
        }
    }

    pub fn locator(&self) -> LocatorConfig {
        LocatorConfig {
            max_scan_rows: self.max_scan_rows,
            probe_rows: self.probe_rows,
            ..LocatorConfig::default()
        }
    }

    pub fn orchestrator(&self) -> TrainingOrchestrator {
        TrainingOrchestrator::with_split(self.test_fraction, self.seed)
    }
}
