//! Schema harmonization: from a located survey table to canonical model input.
//!
//! The harmonizer selects recognized feature columns, encodes the disposition
//! label into an ordinal target, imputes missing numeric values with per-column
//! medians and emits two tables over the same surviving rows:
//!
//! - the canonical table (renamed features in canonical order, `target`, identifier)
//! - the unscaled table (original feature headers, `target`, identifier) used for
//!   display, prediction reports and model dispatch

mod harmonizer;
mod impute;
mod report;

pub use harmonizer::{HarmonizedDataset, SchemaHarmonizer};
pub use impute::{ImputedColumn, impute_median, median};
pub use report::{FeatureKind, FeatureMapping, HarmonizationReport};
