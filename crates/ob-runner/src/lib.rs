//! # ob-runner
//!
//! Evaluates OptBench test functions on trials, attaches Gaussian observation
//! noise and reports results keyed by arm name.

mod config;
mod noise;
mod runner;
mod trials;

pub use config::{RunnerConfig, SurrogatePreset, TestFunctionConfig, SEED_ENV_VAR};
pub use noise::NoiseStd;
pub use runner::BenchmarkRunner;
pub use trials::{run_sampled_trial, TrialRecord};
