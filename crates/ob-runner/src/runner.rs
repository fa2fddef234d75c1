//! The benchmark runner: evaluates trials against a test function.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use ob_functions::{BenchmarkTestFunction, TestFunction};
use ob_types::{
    unsupported_error, ObResult, Parameters, RunMetadata, RunnerError, Trial, TrialStatus,
};

use crate::noise::NoiseStd;

/// Runs trials synchronously against a test function and reports noisy
/// outcomes.
///
/// Outcome `i` of every arm receives independent `N(0, std_i^2)` noise, where
/// the stds come from the noise setting resolved against `outcome_names`. When a
/// std is zero no noise is drawn and the reported value is the oracle value.
#[derive(Debug)]
pub struct BenchmarkRunner {
    test_function: TestFunction,
    outcome_names: Vec<String>,
    noise_std: NoiseStd,
    stds: Vec<f64>,
    rng: Mutex<StdRng>,
}

impl BenchmarkRunner {
    pub fn new(
        test_function: impl Into<TestFunction>,
        outcome_names: Vec<String>,
        noise_std: impl Into<NoiseStd>,
    ) -> ObResult<Self> {
        if outcome_names.is_empty() {
            return Err(RunnerError::NoOutcomes.into());
        }
        let mut seen = HashSet::new();
        if let Some(name) = outcome_names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(RunnerError::DuplicateOutcome { name: name.clone() }.into());
        }

        let noise_std = noise_std.into();
        let stds = noise_std.resolve(&outcome_names)?;
        let test_function = test_function.into();

        info!(
            "Created benchmark runner for {} with outcomes {:?}",
            test_function.name(),
            outcome_names
        );

        Ok(Self {
            test_function,
            outcome_names,
            noise_std,
            stds,
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    /// Reseed the noise stream.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    /// Same outcomes and noise, different test function.
    pub fn with_test_function(mut self, test_function: impl Into<TestFunction>) -> Self {
        self.test_function = test_function.into();
        self
    }

    pub fn test_function(&self) -> &TestFunction {
        &self.test_function
    }

    pub fn outcome_names(&self) -> &[String] {
        &self.outcome_names
    }

    pub fn noise_std(&self) -> &NoiseStd {
        &self.noise_std
    }

    /// Noise std per outcome name.
    pub fn get_noise_stds(&self) -> HashMap<String, f64> {
        self.outcome_names
            .iter()
            .cloned()
            .zip(self.stds.iter().copied())
            .collect()
    }

    /// Noiseless outcomes at `params`, in outcome-name order.
    pub fn get_y_true(&self, params: &Parameters) -> ObResult<Vec<f64>> {
        let y = self.test_function.evaluate_true(params)?;
        if y.len() != self.outcome_names.len() {
            return Err(RunnerError::OutcomeCountMismatch {
                expected: self.outcome_names.len(),
                actual: y.len(),
            }
            .into());
        }
        Ok(y)
    }

    /// Ground-truth outcomes used to score a benchmark; identical to
    /// [`get_y_true`](Self::get_y_true).
    pub fn evaluate_oracle(&self, parameters: &Parameters) -> ObResult<Vec<f64>> {
        self.get_y_true(parameters)
    }

    /// Evaluate every arm of `trial` and return the noisy observations.
    pub fn run(&self, trial: &Trial) -> ObResult<RunMetadata> {
        if trial.arms.is_empty() {
            return Err(RunnerError::EmptyTrial { index: trial.index }.into());
        }
        info!(
            "Running trial {} with {} arm(s) on {}",
            trial.index,
            trial.arms.len(),
            self.test_function.name()
        );

        let mut metadata = RunMetadata::new(self.outcome_names.clone());
        for arm in &trial.arms {
            let y_true = self.get_y_true(&arm.parameters)?;
            let y = self.add_noise(y_true);
            debug!("Arm {}: {:?}", arm.name, y);
            metadata.ys.insert(arm.name.clone(), y);
            metadata.ystds.insert(arm.name.clone(), self.stds.clone());
        }
        Ok(metadata)
    }

    /// Evaluation is synchronous, so every trial handed in is complete.
    pub fn poll_trial_status(&self, trials: &[Trial]) -> HashMap<TrialStatus, HashSet<usize>> {
        HashMap::from([(
            TrialStatus::Completed,
            trials.iter().map(|t| t.index).collect(),
        )])
    }

    pub fn serialize_init_args(
        _obj: &BenchmarkRunner,
    ) -> ObResult<serde_json::Map<String, serde_json::Value>> {
        Err(unsupported_error!(
            "serialize_init_args is not a supported method for BenchmarkRunner."
        ))
    }

    pub fn deserialize_init_args(
        _args: &serde_json::Map<String, serde_json::Value>,
    ) -> ObResult<serde_json::Map<String, serde_json::Value>> {
        Err(unsupported_error!(
            "deserialize_init_args is not a supported method for BenchmarkRunner."
        ))
    }

    fn add_noise(&self, mut y: Vec<f64>) -> Vec<f64> {
        if self.noise_std.is_zero() {
            return y;
        }
        let mut rng = self.rng.lock();
        for (value, std) in y.iter_mut().zip(&self.stds) {
            if *std > 0.0 {
                *value += std * rng.sample::<f64, _>(StandardNormal);
            }
        }
        y
    }
}

impl Clone for BenchmarkRunner {
    fn clone(&self) -> Self {
        Self {
            test_function: self.test_function.clone(),
            outcome_names: self.outcome_names.clone(),
            noise_std: self.noise_std.clone(),
            stds: self.stds.clone(),
            rng: Mutex::new(self.rng.lock().clone()),
        }
    }
}

impl PartialEq for BenchmarkRunner {
    fn eq(&self, other: &Self) -> bool {
        self.test_function == other.test_function
            && self.outcome_names == other.outcome_names
            && self.noise_std == other.noise_std
    }
}
