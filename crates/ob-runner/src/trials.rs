//! Sampling and running whole trials, and the per-trial record `ob-run`
//! prints.

use serde::Serialize;
use tracing::warn;

use ob_types::{validation_error, ObResult, RandomSearch, RunMetadata, Trial, TrialStatus};

use crate::runner::BenchmarkRunner;

/// Outcome of one trial as written to the output stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub trial_index: usize,
    pub status: TrialStatus,
    pub result: Option<RunMetadata>,
    pub error: Option<String>,
}

impl From<&Trial> for TrialRecord {
    fn from(trial: &Trial) -> Self {
        Self {
            trial_index: trial.index,
            status: trial.status,
            result: trial.run_metadata.clone(),
            error: trial.error.clone(),
        }
    }
}

/// Draw `arms` assignments from `search` into trial `index` and run it.
///
/// Evaluation errors do not propagate: they leave the trial `Failed` with the
/// message recorded. Only a request for zero arms is an error.
pub fn run_sampled_trial(
    runner: &BenchmarkRunner,
    search: &mut RandomSearch,
    index: usize,
    arms: usize,
) -> ObResult<Trial> {
    if arms == 0 {
        return Err(validation_error!("trial {index} needs at least one arm"));
    }
    let mut trial = Trial::batch(index, search.suggest(arms));
    trial.mark_running();
    match runner.run(&trial) {
        Ok(metadata) => trial.mark_completed(metadata),
        Err(e) => {
            warn!("Trial {index} failed: {e}");
            trial.mark_failed(e.to_string());
        }
    }
    Ok(trial)
}
