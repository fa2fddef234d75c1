//! JSON runner configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use ob_functions::{
    BoTorchTestFunction, ParamBasedTestFunction, SurrogateTestFunction, SyntheticProblem,
    TestFunction,
};
use ob_types::{config_error, FunctionError, ObResult};

use crate::noise::NoiseStd;
use crate::runner::BenchmarkRunner;

/// Environment variable that overrides the configured noise seed.
pub const SEED_ENV_VAR: &str = "OPTBENCH_SEED";

/// Surrogate test functions that can be built from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurrogatePreset {
    SooBranin,
}

/// Declarative description of a test function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestFunctionConfig {
    Botorch {
        problem: SyntheticProblem,
        #[serde(default)]
        modified_bounds: Option<Vec<(f64, f64)>>,
        /// Must stay unset: observation noise is configured on the runner.
        #[serde(default)]
        noise_std: Option<f64>,
    },
    ParamBased {
        function: ParamBasedTestFunction,
    },
    Surrogate {
        preset: SurrogatePreset,
        #[serde(default)]
        lazy: bool,
    },
}

impl TestFunctionConfig {
    pub fn build(&self) -> ObResult<TestFunction> {
        match self {
            Self::Botorch {
                problem,
                modified_bounds,
                noise_std,
            } => {
                if noise_std.is_some() {
                    return Err(FunctionError::NoisyProblem {
                        problem: problem.name().to_string(),
                    }
                    .into());
                }
                problem.validate()?;
                let f = match modified_bounds {
                    Some(bounds) => {
                        BoTorchTestFunction::with_modified_bounds(*problem, bounds.clone())?
                    }
                    None => BoTorchTestFunction::new(*problem),
                };
                Ok(f.into())
            }
            Self::ParamBased { function } => Ok(function.clone().into()),
            Self::Surrogate { preset, lazy } => match preset {
                SurrogatePreset::SooBranin => {
                    Ok(SurrogateTestFunction::soo_branin(*lazy)?.into())
                }
            },
        }
    }
}

/// Everything needed to construct a [`BenchmarkRunner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub test_function: TestFunctionConfig,
    pub outcome_names: Vec<String>,
    #[serde(default)]
    pub noise_std: NoiseStd,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RunnerConfig {
    /// Read a JSON config file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> ObResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?.with_overrides(|key| std::env::var(key).ok())?;
        info!("Loaded runner config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> ObResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply overrides looked up by variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> ObResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SEED_ENV_VAR) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| config_error!("{SEED_ENV_VAR}={raw:?} is not a valid seed: {e}"))?;
            self.seed = Some(seed);
        }
        Ok(self)
    }

    pub fn build_runner(&self) -> ObResult<BenchmarkRunner> {
        let runner = BenchmarkRunner::new(
            self.test_function.build()?,
            self.outcome_names.clone(),
            self.noise_std.clone(),
        )?;
        Ok(match self.seed {
            Some(seed) => runner.with_seed(seed),
            None => runner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ob_functions::BenchmarkTestFunction;
    use ob_types::ObError;
    use std::io::Write;

    const HARTMANN_CONFIG: &str = r#"{
        "test_function": {"kind": "botorch", "problem": {"constrained_hartmann": {"dim": 6}}},
        "outcome_names": ["objective", "constraint"],
        "noise_std": {"objective": 0.1, "constraint": 0.05},
        "seed": 42
    }"#;

    #[test]
    fn parses_botorch_config() {
        let config = RunnerConfig::from_json_str(HARTMANN_CONFIG).unwrap();
        assert_eq!(config.seed, Some(42));
        let runner = config.build_runner().unwrap();
        assert_eq!(runner.test_function().name(), "constrained_hartmann");
        assert_eq!(runner.get_noise_stds()["constraint"], 0.05);
    }

    #[test]
    fn parses_param_based_and_surrogate() {
        let config = RunnerConfig::from_json_str(
            r#"{
                "test_function": {"kind": "param_based", "function": {"name": "dummy", "dim": 6, "num_outcomes": 2}},
                "outcome_names": ["objective_0", "objective_1"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.noise_std, NoiseStd::Scalar(0.0));
        assert_eq!(config.build_runner().unwrap().test_function().num_outcomes(), 2);

        let config = RunnerConfig::from_json_str(
            r#"{
                "test_function": {"kind": "surrogate", "preset": "soo_branin", "lazy": true},
                "outcome_names": ["branin"],
                "noise_std": [1.0]
            }"#,
        )
        .unwrap();
        let runner = config.build_runner().unwrap();
        assert!(runner.test_function().is_surrogate());
    }

    #[test]
    fn modified_bounds_from_config() {
        let config = RunnerConfig::from_json_str(
            r#"{
                "test_function": {"kind": "botorch", "problem": {"hartmann": {"dim": 6}},
                                  "modified_bounds": [[0.0, 2.0], [0.0, 2.0], [0.0, 2.0], [0.0, 2.0], [0.0, 2.0], [0.0, 2.0]]},
                "outcome_names": ["objective_0"]
            }"#,
        )
        .unwrap();
        match config.test_function.build().unwrap() {
            TestFunction::BoTorch(f) => assert_eq!(f.modified_bounds, Some(vec![(0.0, 2.0); 6])),
            other => panic!("unexpected function: {other:?}"),
        }
    }

    #[test]
    fn noise_on_problem_is_rejected() {
        let config = TestFunctionConfig::Botorch {
            problem: SyntheticProblem::Branin,
            modified_bounds: None,
            noise_std: Some(0.1),
        };
        assert!(matches!(
            config.build(),
            Err(ObError::Function(FunctionError::NoisyProblem { .. }))
        ));
    }

    #[test]
    fn undefined_dimensions_are_rejected() {
        for problem in [r#"{"hartmann": {"dim": 5}}"#, r#"{"ackley": {"dim": 0}}"#] {
            let config = RunnerConfig::from_json_str(&format!(
                r#"{{
                    "test_function": {{"kind": "botorch", "problem": {problem}}},
                    "outcome_names": ["objective_0"]
                }}"#
            ))
            .unwrap();
            assert!(
                matches!(
                    config.build_runner(),
                    Err(ObError::Function(FunctionError::UnsupportedDimension { .. }))
                ),
                "{problem} should not build"
            );
        }
    }

    #[test]
    fn seed_override() {
        let config = RunnerConfig::from_json_str(HARTMANN_CONFIG).unwrap();
        let overridden = config
            .clone()
            .with_overrides(|key| (key == SEED_ENV_VAR).then(|| " 7 ".to_string()))
            .unwrap();
        assert_eq!(overridden.seed, Some(7));

        let untouched = config.clone().with_overrides(|_| None).unwrap();
        assert_eq!(untouched.seed, Some(42));

        assert!(matches!(
            config.with_overrides(|_| Some("seven".to_string())),
            Err(ObError::Config(_))
        ));
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HARTMANN_CONFIG.as_bytes()).unwrap();

        let config = RunnerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.outcome_names, vec!["objective", "constraint"]);

        assert!(matches!(
            RunnerConfig::from_file(file.path().with_extension("missing")),
            Err(ObError::Io(_))
        ));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        assert!(matches!(
            RunnerConfig::from_json_str("{"),
            Err(ObError::Serialization(_))
        ));
    }
}
