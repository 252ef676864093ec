//! Trained models, the prediction interface and model artifacts.

pub mod artifact;
mod classifier;
mod gbdt;
mod tree;

pub use artifact::ArtifactFormat;
pub use classifier::Classifier;
pub use gbdt::GradientBoostedModel;
pub use tree::{Node, Tree};
