//! CLI command implementations.

pub mod harmonize;
pub mod predict;
pub mod sample;
pub mod serve;
pub mod train;

use std::path::Path;

use horizon::HorizonConfig;

/// Read `--config` if given, else the defaults.
pub fn load_config(path: Option<&Path>) -> Result<HorizonConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(HorizonConfig::load(path)?),
        None => Ok(HorizonConfig::default()),
    }
}
