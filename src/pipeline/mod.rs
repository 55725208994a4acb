//! Composable feature transformation
//!
//! Building blocks, smallest first: steps ([`Imputer`], [`OneHotEncoder`],
//! [`Scaler`]) fit on a training slice and replay their learned state on
//! new data; a [`TransformChain`] sequences steps; a [`Combiner`] routes
//! column groups to per-group chains and concatenates their outputs; a
//! [`Pipeline`] sequences stages and optionally terminates in an estimator.

pub mod chain;
pub mod combine;
pub mod encode;
pub mod error;
pub mod impute;
pub mod loader;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod router;
pub mod scale;
pub mod split;
pub mod step;

pub use chain::{FittedChain, TransformChain};
pub use combine::{Combiner, FittedCombiner};
pub use encode::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
pub use error::{SearchError, TransformError};
pub use impute::{FillValue, FittedImputer, ImputeStrategy, Imputer};
pub use loader::load_dataset;
pub use pipeline::{FittedPipeline, Pipeline, PipelineStage, Terminal};
pub use router::{infer_groups, ColumnGroup, ColumnRouter};
pub use scale::{FittedScaler, ScaleMethod, Scaler};
pub use split::train_test_split;
pub use step::{FittedStep, TransformStep};
