//! Typed parameter paths, values, and grids
//!
//! A parameter is addressed by a [`ParamPath`] — a typed location inside a
//! concrete pipeline (stage, optional branch, step, or the terminal
//! estimator) — rather than a delimiter-encoded string. Paths are resolved
//! and type-checked against the pipeline before any fitting starts, so a
//! typo fails in milliseconds instead of after half a search.

use std::fmt;

use serde::Serialize;

use crate::pipeline::encode::HandleUnknown;
use crate::pipeline::impute::ImputeStrategy;
use crate::pipeline::scale::ScaleMethod;

/// A typed address of one configurable knob in a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamPath {
    /// A transform step, optionally inside a combiner branch.
    Step {
        stage: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        step: String,
    },
    /// The terminal estimator stage.
    Estimator { name: String },
}

impl ParamPath {
    /// Address a step inside a combiner branch:
    /// `stage / branch / step`.
    pub fn branch_step(
        stage: impl Into<String>,
        branch: impl Into<String>,
        step: impl Into<String>,
    ) -> Self {
        ParamPath::Step {
            stage: stage.into(),
            branch: Some(branch.into()),
            step: step.into(),
        }
    }

    /// Address a step in a plain chain stage: `stage / step`.
    pub fn chain_step(stage: impl Into<String>, step: impl Into<String>) -> Self {
        ParamPath::Step {
            stage: stage.into(),
            branch: None,
            step: step.into(),
        }
    }

    /// Address the terminal estimator by its stage name.
    pub fn estimator(name: impl Into<String>) -> Self {
        ParamPath::Estimator { name: name.into() }
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamPath::Step {
                stage,
                branch: Some(branch),
                step,
            } => write!(f, "{}/{}/{}", stage, branch, step),
            ParamPath::Step {
                stage,
                branch: None,
                step,
            } => write!(f, "{}/{}", stage, step),
            ParamPath::Estimator { name } => write!(f, "{}", name),
        }
    }
}

/// A typed candidate value for one knob.
///
/// The variant doubles as the knob's name: a `Strategy` value can only be
/// applied to an imputer step, `Method` only to a scaler, and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    /// Imputer strategy.
    Strategy(ImputeStrategy),
    /// Imputer missing-indicator flag.
    AddIndicator(bool),
    /// Encoder unknown-category policy.
    UnknownPolicy(HandleUnknown),
    /// Scaler method.
    Method(ScaleMethod),
    /// Estimator learning rate.
    LearningRate(f64),
    /// Estimator epoch count.
    Epochs(usize),
    /// Estimator L2 penalty.
    L2(f64),
}

impl ParamValue {
    /// The knob name, used in reports and error messages.
    pub fn knob(&self) -> &'static str {
        match self {
            ParamValue::Strategy(_) => "strategy",
            ParamValue::AddIndicator(_) => "add_indicator",
            ParamValue::UnknownPolicy(_) => "handle_unknown",
            ParamValue::Method(_) => "method",
            ParamValue::LearningRate(_) => "learning_rate",
            ParamValue::Epochs(_) => "epochs",
            ParamValue::L2(_) => "l2",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Strategy(v) => write!(f, "strategy={}", v),
            ParamValue::AddIndicator(v) => write!(f, "add_indicator={}", v),
            ParamValue::UnknownPolicy(v) => write!(f, "handle_unknown={}", v),
            ParamValue::Method(v) => write!(f, "method={}", v),
            ParamValue::LearningRate(v) => write!(f, "learning_rate={}", v),
            ParamValue::Epochs(v) => write!(f, "epochs={}", v),
            ParamValue::L2(v) => write!(f, "l2={}", v),
        }
    }
}

/// One concrete assignment drawn from the grid.
pub type Candidate = Vec<(ParamPath, ParamValue)>;

/// A mapping from parameter paths to candidate value sets.
///
/// The Cartesian product of the value sets is the search space.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    dims: Vec<(ParamPath, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one grid dimension. Dimension order fixes enumeration order.
    pub fn add(mut self, path: ParamPath, values: Vec<ParamValue>) -> Self {
        self.dims.push((path, values));
        self
    }

    /// The grid dimensions, in declaration order.
    pub fn dims(&self) -> &[(ParamPath, Vec<ParamValue>)] {
        &self.dims
    }

    /// Total number of combinations (product of set cardinalities).
    pub fn len(&self) -> usize {
        if self.dims.is_empty() {
            return 0;
        }
        self.dims.iter().map(|(_, values)| values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every combination in odometer order: the last dimension
    /// varies fastest. Enumeration order is the tie-break order for
    /// ranking, so it must be stable.
    pub fn combinations(&self) -> Vec<Candidate> {
        if self.is_empty() {
            return Vec::new();
        }

        let mut combos: Vec<Candidate> = vec![Vec::new()];
        for (path, values) in &self.dims {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut extended = combo.clone();
                    extended.push((path.clone(), value.clone()));
                    next.push(extended);
                }
            }
            combos = next;
        }
        combos
    }
}
