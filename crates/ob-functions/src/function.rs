//! The common test-function contract and the closed set of variants.

use ob_types::{ObResult, Parameters, SearchSpace};

use crate::botorch::BoTorchTestFunction;
use crate::param_based::ParamBasedTestFunction;
use crate::surrogate::SurrogateTestFunction;

/// A function mapping a parameter assignment to a vector of outcomes.
pub trait BenchmarkTestFunction {
    /// Human-readable function name.
    fn name(&self) -> &str;

    /// Length of the vector returned by [`evaluate_true`](Self::evaluate_true).
    fn num_outcomes(&self) -> usize;

    /// Noiseless outcomes at `params`.
    fn evaluate_true(&self, params: &Parameters) -> ObResult<Vec<f64>>;

    /// Space the function is meant to be evaluated over.
    fn default_search_space(&self) -> SearchSpace;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestFunction {
    BoTorch(BoTorchTestFunction),
    ParamBased(ParamBasedTestFunction),
    Surrogate(SurrogateTestFunction),
}

impl TestFunction {
    fn inner(&self) -> &dyn BenchmarkTestFunction {
        match self {
            Self::BoTorch(f) => f,
            Self::ParamBased(f) => f,
            Self::Surrogate(f) => f,
        }
    }

    pub fn is_surrogate(&self) -> bool {
        matches!(self, Self::Surrogate(_))
    }
}

impl BenchmarkTestFunction for TestFunction {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn num_outcomes(&self) -> usize {
        self.inner().num_outcomes()
    }

    fn evaluate_true(&self, params: &Parameters) -> ObResult<Vec<f64>> {
        self.inner().evaluate_true(params)
    }

    fn default_search_space(&self) -> SearchSpace {
        self.inner().default_search_space()
    }
}

impl From<BoTorchTestFunction> for TestFunction {
    fn from(f: BoTorchTestFunction) -> Self {
        Self::BoTorch(f)
    }
}

impl From<ParamBasedTestFunction> for TestFunction {
    fn from(f: ParamBasedTestFunction) -> Self {
        Self::ParamBased(f)
    }
}

impl From<SurrogateTestFunction> for TestFunction {
    fn from(f: SurrogateTestFunction) -> Self {
        Self::Surrogate(f)
    }
}
