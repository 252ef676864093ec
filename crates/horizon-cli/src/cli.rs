//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Horizon: harmonize exoplanet survey exports, train boosted trees, classify candidates
#[derive(Parser)]
#[command(name = "horizon")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Directory holding the pretrained mission models
        #[arg(short, long, value_name = "DIR")]
        models: Option<PathBuf>,
    },

    /// Harmonize a survey export into the canonical schema
    Harmonize {
        /// Path to the export (CSV/TSV, preamble allowed)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the processed table (default: processed_data.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the harmonization summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train a gradient-boosted classifier on a survey export
    Train {
        /// Path to the export
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Boosting backend
        #[arg(short, long, default_value = "xgb")]
        backend: BackendChoice,

        /// Number of boosting rounds
        #[arg(long)]
        n_estimators: Option<usize>,

        /// Maximum tree depth (-1 for unlimited with lgbm)
        #[arg(long, allow_hyphen_values = true)]
        max_depth: Option<i64>,

        /// Shrinkage applied to each tree
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Leaf limit for lgbm
        #[arg(long)]
        num_leaves: Option<usize>,

        /// Write the trained model artifact here
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Print the training result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify every row of a survey export
    Predict {
        /// Path to the export
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Use this model artifact instead of the pretrained mission models
        #[arg(long)]
        model: Option<PathBuf>,

        /// Directory holding the pretrained mission models
        #[arg(long, value_name = "DIR")]
        models: Option<PathBuf>,

        /// Output path for the predictions (default: orbital_horizon_predictions.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download a sample mission catalog
    Sample {
        /// Which catalog
        #[arg(value_name = "NAME")]
        name: SampleChoice,

        /// Output path (default: <name>_data.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Boosting backend choice for the CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendChoice {
    /// Depth-wise trees
    Xgb,
    /// Leaf-wise trees with early stopping
    Lgbm,
}

impl BackendChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendChoice::Xgb => "xgb",
            BackendChoice::Lgbm => "lgbm",
        }
    }
}

/// Sample catalog choice for the CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SampleChoice {
    Kepler,
    K2,
    Tess,
}

impl From<SampleChoice> for horizon::samples::SampleDataset {
    fn from(choice: SampleChoice) -> Self {
        match choice {
            SampleChoice::Kepler => horizon::samples::SampleDataset::Kepler,
            SampleChoice::K2 => horizon::samples::SampleDataset::K2,
            SampleChoice::Tess => horizon::samples::SampleDataset::Tess,
        }
    }
}
