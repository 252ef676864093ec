//! Canonical schema: alias vocabularies, the ordinal target and columnar frames.

mod frame;
mod types;
pub mod vocabulary;

pub use frame::{Column, ColumnValues, Frame, Record, format_number};
pub use types::{ColumnRole, TargetClass};
