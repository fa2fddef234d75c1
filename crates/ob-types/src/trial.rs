//! Trials, arms and the result record a runner writes back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parameters::Parameters;

/// One parameter assignment under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub name: String,
    pub parameters: Parameters,
}

impl Arm {
    pub fn new(name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrialStatus {
    Candidate,
    Staged,
    Running,
    Completed,
    Failed,
    Abandoned,
}

impl TrialStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Abandoned)
    }
}

/// Noisy outcomes per arm, as produced by a benchmark runner.
///
/// Serializes with the fixed keys `Ys`, `Ystds` and `outcome_names`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Observed (noisy) outcome values keyed by arm name.
    #[serde(rename = "Ys")]
    pub ys: BTreeMap<String, Vec<f64>>,
    /// Noise standard deviations keyed by arm name, in outcome order.
    #[serde(rename = "Ystds")]
    pub ystds: BTreeMap<String, Vec<f64>>,
    pub outcome_names: Vec<String>,
}

impl RunMetadata {
    pub fn new(outcome_names: Vec<String>) -> Self {
        Self {
            ys: BTreeMap::new(),
            ystds: BTreeMap::new(),
            outcome_names,
        }
    }

    /// Observed value of `outcome` for `arm_name`.
    pub fn outcome(&self, arm_name: &str, outcome: &str) -> Option<f64> {
        let idx = self.outcome_names.iter().position(|n| n == outcome)?;
        self.ys.get(arm_name)?.get(idx).copied()
    }
}

/// A scheduling unit containing one or more arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub index: usize,
    pub arms: Vec<Arm>,
    pub status: TrialStatus,
    pub run_metadata: Option<RunMetadata>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl Trial {
    /// Single-arm trial; the arm is named `"{index}_0"`.
    pub fn new(index: usize, parameters: Parameters) -> Self {
        Self::with_arm(index, Arm::new(format!("{index}_0"), parameters))
    }

    pub fn with_arm(index: usize, arm: Arm) -> Self {
        Self::with_arms(index, vec![arm])
    }

    /// Batch trial; arms are named `"{index}_{j}"`.
    pub fn batch(index: usize, parameters: Vec<Parameters>) -> Self {
        let arms = parameters
            .into_iter()
            .enumerate()
            .map(|(j, params)| Arm::new(format!("{index}_{j}"), params))
            .collect();
        Self::with_arms(index, arms)
    }

    fn with_arms(index: usize, arms: Vec<Arm>) -> Self {
        Self {
            index,
            arms,
            status: TrialStatus::Candidate,
            run_metadata: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// The only arm of a single-arm trial.
    pub fn arm(&self) -> Option<&Arm> {
        match self.arms.as_slice() {
            [arm] => Some(arm),
            _ => None,
        }
    }

    pub fn mark_running(&mut self) {
        self.status = TrialStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, metadata: RunMetadata) {
        self.status = TrialStatus::Completed;
        self.finished_at = Some(Utc::now());
        self.run_metadata = Some(metadata);
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = TrialStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }
}
