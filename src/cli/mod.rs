// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Commands:
//   1. `train`   — fit the classifier and record a tracked run
//   2. `predict` — score input with a saved model
//   3. `invoke`  — post a payload to a serving endpoint
//   4. `runs`    — list recorded runs
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use commands::{Commands, InvokeArgs, PredictArgs, RunsArgs, TrainArgs};

use crate::infra::tracking::ExperimentTracker;

#[derive(Parser, Debug)]
#[command(
    name = "video-category-trainer",
    version = "0.1.0",
    about = "Train a tag-based video category classifier, track the run, and query it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Invoke(args)  => run_invoke(args),
            Commands::Runs(args)    => run_runs(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on data in: {}", args.data_dir);
    let report = TrainUseCase::new(args.into()).execute()?;

    println!("\nValidation loss:     {:.4}", report.evaluation.loss);
    println!("Validation accuracy: {:.4}", report.evaluation.accuracy);
    println!("Output vector: {:?}", report.output_vector);
    println!("Target vector: {:?}", report.target_vector);
    println!(
        "RMSE {:.4} | MAE {:.4} | R2 {:.4}",
        report.diagnostics.rmse, report.diagnostics.mae, report.diagnostics.r2
    );
    println!("Model saved to {}", report.weights_file.display());
    println!("Run {} ({}) {}", report.run.run_name, report.run.run_id, report.run.status);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.model_path)?;
    let predictions = use_case.execute(&args.into())?;

    for (i, p) in predictions.iter().enumerate() {
        let category = p
            .category_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!("[{i}] category={category} probabilities={:?}", p.probabilities);
    }
    Ok(())
}

fn run_invoke(args: InvokeArgs) -> Result<()> {
    use crate::application::invoke_use_case::InvokeUseCase;

    let response = InvokeUseCase::new(args.into()).execute()?;
    println!("{}", response.body_text());
    if !(200..300).contains(&response.status) {
        tracing::warn!("Endpoint answered with status {}", response.status);
    }
    Ok(())
}

fn run_runs(args: RunsArgs) -> Result<()> {
    let tracker = ExperimentTracker::new(&args.tracking_dir);
    let Some(experiment) = tracker.get_experiment_by_name(&args.experiment)? else {
        bail!("No experiment named '{}' under '{}'", args.experiment, tracker.root().display());
    };

    let runs = tracker.list_runs(&experiment)?;
    if runs.is_empty() {
        println!("No runs recorded for '{}'", experiment.name);
        return Ok(());
    }

    for run in runs {
        let started = DateTime::<Utc>::from_timestamp_millis(run.info.start_time)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let metrics = run
            .metrics
            .iter()
            .map(|(k, v)| format!("{k}={v:.4}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{}  {:<8}  {}  {}  {}",
            run.info.run_id, run.info.status, started, run.info.run_name, metrics
        );
    }
    Ok(())
}
