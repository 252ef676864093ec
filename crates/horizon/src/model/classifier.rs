//! The prediction capability shared by every model.

use crate::error::Result;
use crate::schema::TargetClass;
use crate::training::FeatureMatrix;

/// A fitted classifier over named features.
pub trait Classifier {
    /// Feature names the model expects, in input order.
    fn feature_names(&self) -> &[String];

    /// Ordinal classes the model can predict, ascending.
    fn classes(&self) -> &[TargetClass];

    /// One probability row per input row, columns ordered as [`Classifier::classes`].
    fn predict_class_probabilities(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>>;

    /// Most probable class per row.
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<TargetClass>>;
}
