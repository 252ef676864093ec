//! Horizon: harmonization, gradient boosting and model dispatch for
//! exoplanet survey catalogs.
//!
//! Kepler, K2 and TESS archive exports describe the same physical quantities
//! under different column names and label vocabularies. Horizon finds the real
//! header in a raw export, maps it onto one canonical schema with an ordinal
//! target, trains one of two gradient-boosted tree backends on it and predicts
//! with pretrained per-mission models.
//!
//! # Pipeline
//!
//! - [`input::HeaderLocator`] skips the free-text preamble of an export
//! - [`harmonize::SchemaHarmonizer`] renames, encodes, imputes and orders
//! - [`training::TrainingOrchestrator`] splits, fits and evaluates
//! - [`dispatch::ModelDispatcher`] selects a pretrained model and predicts
//! - [`Session`] holds the active dataset, trained model and predictions
//!
//! # Example
//!
//! ```no_run
//! use horizon::{Horizon, Session};
//! use horizon::training::Hyperparameters;
//!
//! let horizon = Horizon::new();
//! let mut session = Session::new();
//!
//! let bytes = std::fs::read("cumulative.csv").unwrap();
//! let summary = horizon.upload(&mut session, "cumulative.csv", &bytes).unwrap();
//! println!("Header at line {}", summary.report.header_line);
//!
//! let result = horizon
//!     .train_session(&mut session, "xgb", &Hyperparameters::default())
//!     .unwrap();
//! println!("Accuracy: {:.3}", result.accuracy);
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod harmonize;
pub mod input;
pub mod model;
pub mod samples;
pub mod schema;
pub mod session;
pub mod training;

mod horizon;

pub use crate::horizon::{Horizon, UploadSummary};
pub use config::HorizonConfig;
pub use dispatch::{ModelDispatcher, PredictionBatch, PretrainedModel};
pub use error::{HorizonError, Result};
pub use harmonize::{HarmonizationReport, HarmonizedDataset, SchemaHarmonizer};
pub use input::{DataTable, HeaderLocator, SourceMetadata};
pub use model::{Classifier, GradientBoostedModel};
pub use schema::TargetClass;
pub use session::{Session, TrainedModel};
pub use training::{BackendKind, Hyperparameters, TrainingOrchestrator, TrainingResult};
