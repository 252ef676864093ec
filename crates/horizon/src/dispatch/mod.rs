//! Pretrained model dispatch.
//!
//! The dispatcher picks one of three mission models from the original column
//! names of an uploaded table, reconciles the canonical table to the model's
//! own feature list and predicts. Caller-supplied models skip reconciliation.

mod dispatcher;
mod store;

pub use dispatcher::{ModelDispatcher, PredictionBatch, PredictionSource};
pub use store::{DirectoryStore, MemoryStore, ModelStore, PretrainedModel};
