//! Estimator-terminated pipelines
//!
//! A pipeline is an ordered list of named transform stages with an explicit
//! terminal marker: either transform-only output, or a tagged estimator
//! stage. The terminal is part of the type, so "does this pipeline
//! predict?" is a match on [`Terminal`], never a runtime probe of what the
//! last stage happens to respond to.
//!
//! Parameter overrides go through [`Pipeline::set_param`], which resolves a
//! typed [`ParamPath`] against the concrete structure and rejects both
//! unknown addresses and type-mismatched values before any fitting starts.

use polars::prelude::{Column, DataFrame};

use crate::model::{Estimator, FittedEstimator};
use crate::pipeline::chain::{FittedChain, TransformChain};
use crate::pipeline::combine::{Combiner, FittedCombiner};
use crate::pipeline::error::{SearchError, TransformError};
use crate::pipeline::step::TransformStep;
use crate::search::params::{ParamPath, ParamValue};

/// One named transform stage of a pipeline.
#[derive(Debug, Clone)]
pub enum PipelineStage {
    /// Group-routed parallel branches.
    Combine(Combiner),
    /// A plain sequential chain applied to all columns.
    Chain(TransformChain),
}

impl From<Combiner> for PipelineStage {
    fn from(combiner: Combiner) -> Self {
        PipelineStage::Combine(combiner)
    }
}

impl From<TransformChain> for PipelineStage {
    fn from(chain: TransformChain) -> Self {
        PipelineStage::Chain(chain)
    }
}

/// What the pipeline ends in.
#[derive(Debug, Clone, Default)]
pub enum Terminal {
    /// The pipeline's output is the transformed table itself.
    #[default]
    Transform,
    /// The pipeline ends in a named estimator fit on the transformed table.
    Predict { name: String, estimator: Estimator },
}

/// An unfitted pipeline: named transform stages plus a terminal.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<(String, PipelineStage)>,
    terminal: Terminal,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named transform stage.
    pub fn stage(mut self, name: impl Into<String>, stage: impl Into<PipelineStage>) -> Self {
        self.stages.push((name.into(), stage.into()));
        self
    }

    /// Terminate the pipeline in a named estimator.
    pub fn predict_with(mut self, name: impl Into<String>, estimator: Estimator) -> Self {
        self.terminal = Terminal::Predict {
            name: name.into(),
            estimator,
        };
        self
    }

    pub fn stages(&self) -> &[(String, PipelineStage)] {
        &self.stages
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Whether the pipeline ends in an estimator.
    pub fn has_estimator(&self) -> bool {
        matches!(self.terminal, Terminal::Predict { .. })
    }

    /// Apply one typed parameter override.
    ///
    /// Resolution walks stage name, then branch name (for combiner
    /// stages), then step name. A path that resolves to nothing is
    /// [`SearchError::UnresolvedPath`]; a value the resolved step does not
    /// accept is [`SearchError::IncompatibleParam`]. Either way the
    /// pipeline is unchanged on error.
    pub fn set_param(&mut self, path: &ParamPath, value: &ParamValue) -> Result<(), SearchError> {
        match path {
            ParamPath::Estimator { name } => {
                let Terminal::Predict {
                    name: terminal_name,
                    estimator,
                } = &mut self.terminal
                else {
                    return Err(SearchError::UnresolvedPath {
                        path: path.to_string(),
                    });
                };
                if terminal_name != name {
                    return Err(SearchError::UnresolvedPath {
                        path: path.to_string(),
                    });
                }
                apply_estimator_value(estimator, path, value)
            }
            ParamPath::Step {
                stage,
                branch,
                step,
            } => {
                let target = self
                    .stages
                    .iter_mut()
                    .find(|(name, _)| name == stage)
                    .map(|(_, s)| s)
                    .ok_or_else(|| SearchError::UnresolvedPath {
                        path: path.to_string(),
                    })?;

                let chain = match (target, branch) {
                    (PipelineStage::Combine(combiner), Some(branch)) => combiner
                        .branches_mut()
                        .iter_mut()
                        .find(|(group, _)| group.name == *branch)
                        .map(|(_, chain)| chain),
                    (PipelineStage::Chain(chain), None) => Some(chain),
                    _ => None,
                }
                .ok_or_else(|| SearchError::UnresolvedPath {
                    path: path.to_string(),
                })?;

                let target_step = chain
                    .steps_mut()
                    .iter_mut()
                    .find(|(name, _)| name == step)
                    .map(|(_, s)| s)
                    .ok_or_else(|| SearchError::UnresolvedPath {
                        path: path.to_string(),
                    })?;

                apply_step_value(target_step, path, value)
            }
        }
    }

    /// Fit every stage in order, feeding each stage the previous stage's
    /// output, then fit the terminal estimator (if any) on the final
    /// transformed table.
    pub fn fit(
        &self,
        df: &DataFrame,
        target: Option<&Column>,
    ) -> Result<FittedPipeline, TransformError> {
        let mut current = df.clone();
        let mut fitted_stages = Vec::with_capacity(self.stages.len());

        for (name, stage) in &self.stages {
            let (fitted, out) = match stage {
                PipelineStage::Combine(combiner) => {
                    let (fitted, out) = combiner.fit(&current)?;
                    (FittedStage::Combine(fitted), out)
                }
                PipelineStage::Chain(chain) => {
                    let (fitted, out) = chain.fit(&current)?;
                    (FittedStage::Chain(fitted), out)
                }
            };
            current = out;
            fitted_stages.push((name.clone(), fitted));
        }

        let terminal = match &self.terminal {
            Terminal::Transform => FittedTerminal::Transform,
            Terminal::Predict { name, estimator } => {
                let target = target.ok_or_else(|| TransformError::MissingTarget {
                    name: name.clone(),
                })?;
                let fitted = estimator.fit(&current, target)?;
                FittedTerminal::Predict {
                    name: name.clone(),
                    estimator: fitted,
                }
            }
        };

        Ok(FittedPipeline {
            stages: fitted_stages,
            terminal,
        })
    }
}

fn apply_step_value(
    step: &mut TransformStep,
    path: &ParamPath,
    value: &ParamValue,
) -> Result<(), SearchError> {
    match (step, value) {
        (TransformStep::Imputer(config), ParamValue::Strategy(strategy)) => {
            config.strategy = strategy.clone();
            Ok(())
        }
        (TransformStep::Imputer(config), ParamValue::AddIndicator(flag)) => {
            config.add_indicator = *flag;
            Ok(())
        }
        (TransformStep::OneHot(config), ParamValue::UnknownPolicy(policy)) => {
            config.handle_unknown = *policy;
            Ok(())
        }
        (TransformStep::Scaler(config), ParamValue::Method(method)) => {
            config.method = *method;
            Ok(())
        }
        (step, value) => Err(SearchError::IncompatibleParam {
            path: path.to_string(),
            offered: value.knob().to_string(),
            expected: step.kind().to_string(),
        }),
    }
}

fn apply_estimator_value(
    estimator: &mut Estimator,
    path: &ParamPath,
    value: &ParamValue,
) -> Result<(), SearchError> {
    match value {
        ParamValue::LearningRate(rate) => {
            estimator.set_learning_rate(*rate);
            Ok(())
        }
        ParamValue::Epochs(epochs) => {
            estimator.set_epochs(*epochs);
            Ok(())
        }
        ParamValue::L2(l2) => {
            estimator.set_l2(*l2);
            Ok(())
        }
        other => Err(SearchError::IncompatibleParam {
            path: path.to_string(),
            offered: other.knob().to_string(),
            expected: estimator.kind().to_string(),
        }),
    }
}

/// A fitted transform stage.
#[derive(Debug, Clone)]
pub enum FittedStage {
    Combine(FittedCombiner),
    Chain(FittedChain),
}

impl FittedStage {
    fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        match self {
            FittedStage::Combine(combiner) => combiner.transform(df),
            FittedStage::Chain(chain) => chain.transform(df),
        }
    }
}

/// The fitted terminal.
#[derive(Debug, Clone)]
pub enum FittedTerminal {
    Transform,
    Predict {
        name: String,
        estimator: FittedEstimator,
    },
}

/// A fitted pipeline holding every stage's learned state.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    stages: Vec<(String, FittedStage)>,
    terminal: FittedTerminal,
}

impl FittedPipeline {
    pub fn stages(&self) -> &[(String, FittedStage)] {
        &self.stages
    }

    fn apply_stages(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let mut current = df.clone();
        for (_, stage) in &self.stages {
            current = stage.transform(&current)?;
        }
        Ok(current)
    }

    /// Transform new data through every fitted stage.
    ///
    /// Only valid for transform-only pipelines; an estimator-terminated
    /// pipeline's output is predictions, not a table.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        if let FittedTerminal::Predict { name, .. } = &self.terminal {
            return Err(TransformError::EstimatorTerminated { name: name.clone() });
        }
        self.apply_stages(df)
    }

    /// Transform new data and predict with the fitted estimator.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>, TransformError> {
        let FittedTerminal::Predict { estimator, .. } = &self.terminal else {
            return Err(TransformError::NoEstimator);
        };
        let features = self.apply_stages(df)?;
        estimator.predict(&features)
    }

    /// Transform new data and score the fitted estimator against a target.
    pub fn score(&self, df: &DataFrame, target: &Column) -> Result<f64, TransformError> {
        let FittedTerminal::Predict { estimator, .. } = &self.terminal else {
            return Err(TransformError::NoEstimator);
        };
        let features = self.apply_stages(df)?;
        estimator.score(&features, target)
    }
}
