//! Gradient-boosted tree training.
//!
//! [`TrainingOrchestrator`] splits a harmonized table, fits one of the two
//! [`Backend`]s and evaluates the result. The boosting machinery underneath
//! (histogram cuts, tree growers, objectives, metrics) is shared by both.

mod backend;
mod booster;
mod callback;
mod data;
mod evaluation;
mod grower;
mod history;
mod metric;
mod objective;
mod orchestrator;
mod params;
mod quantize;

pub use backend::{Backend, BackendKind, DepthWiseBackend, FitInput, LeafWiseBackend};
pub use booster::{BoostOutput, Booster, EvalSet, NamedMetric};
pub use callback::EarlyStopping;
pub use data::{FeatureMatrix, SplitIndices, train_test_split};
pub use evaluation::{ConfusionMatrix, RocCurve, accuracy};
pub use grower::{GainParams, GrowerParams, GrowthStrategy, TreeGrower};
pub use history::{EvalRecord, EvalsResult, TrainingHistory};
pub use metric::Metric;
pub use objective::Objective;
pub use orchestrator::{TrainingOrchestrator, TrainingOutcome, TrainingResult};
pub use params::{BoosterParams, Hyperparameters};
pub use quantize::{BinCuts, BinnedMatrix, DEFAULT_MAX_BINS};

pub(crate) use metric::argmax;
