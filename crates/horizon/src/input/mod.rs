//! Input parsing and data source handling.

mod parser;
mod source;

pub use parser::{HeaderLocator, LocatedTable, LocatorConfig, ParserConfig};
pub use source::{DataTable, SourceMetadata};
