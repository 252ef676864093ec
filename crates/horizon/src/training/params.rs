//! Caller-facing hyperparameters and their per-backend defaults.

use serde::{Deserialize, Serialize};

use super::grower::{GainParams, GrowthStrategy};
use super::quantize::DEFAULT_MAX_BINS;
use crate::error::{HorizonError, Result};

/// Upper bound on boosting rounds.
pub const MAX_ESTIMATORS: usize = 10_000;

/// Upper bound on leaves per leaf-wise tree.
pub const MAX_LEAVES: usize = 131_072;

/// Hyperparameters a caller may override. Unset fields take backend defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub n_estimators: Option<usize>,
    /// Tree depth limit; zero or negative means unlimited where supported.
    pub max_depth: Option<i64>,
    pub learning_rate: Option<f64>,
    /// Leaf limit for leaf-wise growth.
    pub num_leaves: Option<usize>,
}

/// Fully resolved settings for one boosting run.
#[derive(Debug, Clone, PartialEq)]
pub struct BoosterParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub strategy: GrowthStrategy,
    pub gain: GainParams,
    pub max_bins: usize,
    /// Stop after this many rounds without improvement on the monitored metric.
    pub early_stopping_rounds: Option<usize>,
    /// Log evaluation results every this many rounds.
    pub log_period: Option<usize>,
}

impl Hyperparameters {
    fn check(&self) -> Result<()> {
        if let Some(n) = self.n_estimators {
            if n == 0 || n > MAX_ESTIMATORS {
                return Err(invalid(&format!(
                    "n_estimators must be between 1 and {}, got {}",
                    MAX_ESTIMATORS, n
                )));
            }
        }
        if let Some(lr) = self.learning_rate {
            if !lr.is_finite() || lr <= 0.0 {
                return Err(invalid("learning_rate must be a positive number"));
            }
        }
        if let Some(leaves) = self.num_leaves {
            if !(2..=MAX_LEAVES).contains(&leaves) {
                return Err(invalid(&format!(
                    "num_leaves must be between 2 and {}, got {}",
                    MAX_LEAVES, leaves
                )));
            }
        }
        Ok(())
    }

    /// Settings for depth-wise growth: 100 rounds, depth 3, learning rate 0.1.
    pub fn depth_wise(&self) -> Result<BoosterParams> {
        self.check()?;
        let max_depth = match self.max_depth {
            None => 3,
            Some(d) if d >= 1 => d as usize,
            Some(d) => return Err(invalid(&format!("max_depth must be at least 1, got {}", d))),
        };
        Ok(BoosterParams {
            n_estimators: self.n_estimators.unwrap_or(100),
            learning_rate: self.learning_rate.unwrap_or(0.1),
            strategy: GrowthStrategy::DepthWise { max_depth },
            gain: GainParams::default(),
            max_bins: DEFAULT_MAX_BINS,
            early_stopping_rounds: None,
            log_period: None,
        })
    }

    /// Settings for leaf-wise growth: 100 rounds, 31 leaves, unlimited depth,
    /// learning rate 0.1, early stopping after 20 stale rounds.
    pub fn leaf_wise(&self) -> Result<BoosterParams> {
        self.check()?;
        let max_depth = match self.max_depth {
            Some(d) if d > 0 => Some(d as usize),
            _ => None,
        };
        Ok(BoosterParams {
            n_estimators: self.n_estimators.unwrap_or(100),
            learning_rate: self.learning_rate.unwrap_or(0.1),
            strategy: GrowthStrategy::LeafWise {
                max_leaves: self.num_leaves.unwrap_or(31),
                max_depth,
            },
            gain: GainParams {
                reg_lambda: 0.0,
                min_split_gain: 0.0,
                min_child_weight: 1e-3,
                min_samples_leaf: 20,
            },
            max_bins: DEFAULT_MAX_BINS,
            early_stopping_rounds: Some(20),
            log_period: Some(10),
        })
    }
}

fn invalid(message: &str) -> HorizonError {
    HorizonError::Training(format!("invalid hyperparameter: {}", message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_wise_defaults() {
        let params = Hyperparameters::default().depth_wise().unwrap();
        assert_eq!(params.n_estimators, 100);
        assert_eq!(params.learning_rate, 0.1);
        assert_eq!(params.strategy, GrowthStrategy::DepthWise { max_depth: 3 });
        assert_eq!(params.early_stopping_rounds, None);
    }

    #[test]
    fn test_leaf_wise_defaults() {
        let params = Hyperparameters::default().leaf_wise().unwrap();
        assert_eq!(
            params.strategy,
            GrowthStrategy::LeafWise {
                max_leaves: 31,
                max_depth: None
            }
        );
        assert_eq!(params.early_stopping_rounds, Some(20));
        assert_eq!(params.log_period, Some(10));
    }

    #[test]
    fn test_overrides_apply_to_both_backends() {
        let hyper = Hyperparameters {
            n_estimators: Some(7),
            max_depth: Some(2),
            learning_rate: Some(0.3),
            num_leaves: Some(8),
        };
        let depth = hyper.depth_wise().unwrap();
        assert_eq!(depth.n_estimators, 7);
        assert_eq!(depth.strategy, GrowthStrategy::DepthWise { max_depth: 2 });
        let leaf = hyper.leaf_wise().unwrap();
        assert_eq!(leaf.learning_rate, 0.3);
        assert_eq!(
            leaf.strategy,
            GrowthStrategy::LeafWise {
                max_leaves: 8,
                max_depth: Some(2)
            }
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let zero_rounds = Hyperparameters {
            n_estimators: Some(0),
            ..Default::default()
        };
        assert!(zero_rounds.depth_wise().is_err());
        let negative_depth = Hyperparameters {
            max_depth: Some(-1),
            ..Default::default()
        };
        assert!(negative_depth.depth_wise().is_err());
        assert!(negative_depth.leaf_wise().is_ok());
    }

    #[test]
    fn test_deserializes_partial_json() {
        let hyper: Hyperparameters = serde_json::from_str(r#"{"max_depth": 4}"#).unwrap();
        assert_eq!(hyper.max_depth, Some(4));
        assert_eq!(hyper.n_estimators, None);
    }

    #[test]
    fn test_out_of_range_sizes_are_training_errors() {
        let too_many = Hyperparameters {
            n_estimators: Some(usize::MAX / 8),
            ..Default::default()
        };
        assert!(matches!(too_many.depth_wise(), Err(HorizonError::Training(_))));
        assert!(matches!(too_many.leaf_wise(), Err(HorizonError::Training(_))));

        let at_limit = Hyperparameters {
            n_estimators: Some(MAX_ESTIMATORS),
            ..Default::default()
        };
        assert_eq!(at_limit.depth_wise().unwrap().n_estimators, MAX_ESTIMATORS);

        let zero = Hyperparameters {
            n_estimators: Some(0),
            ..Default::default()
        };
        assert!(zero.depth_wise().is_err());

        let wide = Hyperparameters {
            num_leaves: Some(usize::MAX),
            ..Default::default()
        };
        assert!(matches!(wide.leaf_wise(), Err(HorizonError::Training(_))));
    }
}
