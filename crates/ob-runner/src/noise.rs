//! Observation noise settings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use ob_types::{ObResult, RunnerError};

/// Standard deviation of the Gaussian noise added to each outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoiseStd {
    /// Same std for every outcome.
    Scalar(f64),
    /// One std per outcome, in outcome-name order.
    List(Vec<f64>),
    /// Std keyed by outcome name.
    PerOutcome(BTreeMap<String, f64>),
}

impl Default for NoiseStd {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl From<f64> for NoiseStd {
    fn from(std: f64) -> Self {
        Self::Scalar(std)
    }
}

impl From<Vec<f64>> for NoiseStd {
    fn from(stds: Vec<f64>) -> Self {
        Self::List(stds)
    }
}

impl From<HashMap<String, f64>> for NoiseStd {
    fn from(stds: HashMap<String, f64>) -> Self {
        Self::PerOutcome(stds.into_iter().collect())
    }
}

impl NoiseStd {
    /// Stds aligned with `outcome_names`.
    ///
    /// Fails unless the setting covers exactly the given outcomes and every std
    /// is finite and non-negative.
    pub fn resolve(&self, outcome_names: &[String]) -> ObResult<Vec<f64>> {
        let stds = match self {
            Self::Scalar(std) => vec![*std; outcome_names.len()],
            Self::List(stds) => {
                if stds.len() != outcome_names.len() {
                    return Err(RunnerError::NoiseLengthMismatch {
                        expected: outcome_names.len(),
                        actual: stds.len(),
                    }
                    .into());
                }
                stds.clone()
            }
            Self::PerOutcome(stds) => {
                let names: HashSet<&str> = outcome_names.iter().map(String::as_str).collect();
                let keys: HashSet<&str> = stds.keys().map(String::as_str).collect();
                if names != keys {
                    return Err(RunnerError::NoiseKeyMismatch {
                        keys: stds.keys().cloned().collect(),
                        outcome_names: outcome_names.to_vec(),
                    }
                    .into());
                }
                outcome_names.iter().map(|name| stds[name]).collect()
            }
        };

        if let Some((name, std)) = outcome_names
            .iter()
            .zip(&stds)
            .find(|(_, std)| !std.is_finite() || **std < 0.0)
        {
            return Err(RunnerError::InvalidNoiseStd {
                outcome: name.clone(),
                value: *std,
            }
            .into());
        }
        Ok(stds)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Scalar(std) => *std == 0.0,
            Self::List(stds) => stds.iter().all(|s| *s == 0.0),
            Self::PerOutcome(stds) => stds.values().all(|s| *s == 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ob_types::ObError;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn scalar_broadcasts() {
        let stds = NoiseStd::Scalar(0.3).resolve(&names(&["a", "b"])).unwrap();
        assert_eq!(stds, vec![0.3, 0.3]);
    }

    #[test]
    fn list_is_positional() {
        let stds = NoiseStd::List(vec![0.1, 0.05])
            .resolve(&names(&["objective", "constraint"]))
            .unwrap();
        assert_eq!(stds, vec![0.1, 0.05]);
    }

    #[test]
    fn mapping_follows_outcome_order() {
        let spec = NoiseStd::from(HashMap::from([
            ("constraint".to_string(), 0.05),
            ("objective".to_string(), 0.1),
        ]));
        let stds = spec.resolve(&names(&["objective", "constraint"])).unwrap();
        assert_eq!(stds, vec![0.1, 0.05]);
    }

    #[test]
    fn list_length_mismatch() {
        match NoiseStd::List(vec![0.1]).resolve(&names(&["a", "b"])) {
            Err(ObError::Runner(RunnerError::NoiseLengthMismatch { expected, actual })) => {
                assert_eq!((expected, actual), (2, 1))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mapping_key_mismatch() {
        let spec = NoiseStd::PerOutcome(BTreeMap::from([("a".to_string(), 0.1)]));
        assert!(spec.resolve(&names(&["a", "b"])).is_err());

        let spec = NoiseStd::PerOutcome(BTreeMap::from([
            ("a".to_string(), 0.1),
            ("c".to_string(), 0.1),
        ]));
        assert!(spec.resolve(&names(&["a"])).is_err());
    }

    #[test]
    fn negative_or_nan_rejected() {
        assert!(NoiseStd::Scalar(-1.0).resolve(&names(&["a"])).is_err());
        assert!(NoiseStd::List(vec![0.0, f64::NAN])
            .resolve(&names(&["a", "b"]))
            .is_err());
    }

    #[test]
    fn untagged_json_forms() {
        let scalar: NoiseStd = serde_json::from_str("0.5").unwrap();
        assert_eq!(scalar, NoiseStd::Scalar(0.5));
        let list: NoiseStd = serde_json::from_str("[0.1, 0.2]").unwrap();
        assert_eq!(list, NoiseStd::List(vec![0.1, 0.2]));
        let map: NoiseStd = serde_json::from_str(r#"{"a": 0.1}"#).unwrap();
        assert!(matches!(map, NoiseStd::PerOutcome(_)));
        assert!(NoiseStd::default().is_zero());
    }
}
