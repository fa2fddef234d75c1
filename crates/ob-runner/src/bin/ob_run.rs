//! Sample trials from a test function's search space and run them through a
//! benchmark runner, printing one JSON object per trial.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ob_functions::BenchmarkTestFunction;
use ob_runner::{run_sampled_trial, RunnerConfig, TrialRecord};
use ob_types::{RandomSearch, TrialStatus};

#[derive(Parser)]
#[command(name = "ob-run")]
#[command(version, about, long_about = None)]
struct Args {
    /// Runner configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Number of trials to run
    #[arg(short = 'n', long, default_value_t = 1)]
    trials: usize,

    /// Arms per trial
    #[arg(long, default_value_t = 1)]
    arms: usize,

    /// Seed for noise and arm sampling (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print each result
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = RunnerConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let runner = config.build_runner().context("building runner")?;

    let space = runner.test_function().default_search_space();
    let mut search = match config.seed {
        Some(seed) => RandomSearch::seeded(space, seed.wrapping_add(1)),
        None => RandomSearch::new(space),
    };

    info!(
        "Running {} trial(s) of {} arm(s) on {}",
        args.trials,
        args.arms,
        runner.test_function().name()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut completed = Vec::with_capacity(args.trials);
    let mut failed = 0usize;
    for index in 0..args.trials {
        let trial = run_sampled_trial(&runner, &mut search, index, args.arms)?;
        let record = TrialRecord::from(&trial);
        if args.pretty {
            writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
        } else {
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
        if trial.status == TrialStatus::Completed {
            completed.push(trial);
        } else {
            failed += 1;
        }
    }

    let statuses = runner.poll_trial_status(&completed);
    info!("Trial statuses: {:?}, {} failed", statuses, failed);
    Ok(())
}
