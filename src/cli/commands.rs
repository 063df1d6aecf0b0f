// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `predict`, `invoke` and
// `runs` together with their flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    invoke_use_case::InvokeConfig,
    predict_use_case::PredictConfig,
    train_use_case::TrainConfig,
};
use crate::infra::invocation_client::DEFAULT_ENDPOINT;
use crate::ml::model::DEFAULT_HIDDEN_NODES;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the tag → category classifier and record a tracked run
    Train(TrainArgs),

    /// Score tags or a pandas-split file with a saved model
    Predict(PredictArgs),

    /// POST a pandas-split payload to a serving endpoint
    Invoke(InvokeArgs),

    /// List tracked runs of an experiment, newest first
    Runs(RunsArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory holding videos.json and categories.json
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Weights path without extension; config and vocabulary go next to it
    #[arg(long, default_value = "model/model")]
    pub model_path: String,

    /// Root directory of the experiment tracking store
    #[arg(long, default_value = "mlruns")]
    pub tracking_dir: String,

    #[arg(long, default_value = "aia-deep-learning-sess-001")]
    pub experiment: String,

    #[arg(long, default_value = "deeplearning-11")]
    pub run_name: String,

    /// Number of full passes through the training partition
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Leading share of the videos used for training; the rest validates
    #[arg(long, default_value_t = 0.8)]
    pub training_fraction: f64,

    /// Width of the single hidden layer
    #[arg(long, default_value_t = DEFAULT_HIDDEN_NODES)]
    pub hidden_nodes: usize,

    /// SGD step size
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Number of samples per gradient step
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Seed for weight init and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:          a.data_dir,
            model_path:        a.model_path,
            tracking_dir:      a.tracking_dir,
            experiment_name:   a.experiment,
            run_name:          a.run_name,
            epochs:            a.epochs,
            training_fraction: a.training_fraction,
            hidden_nodes:      a.hidden_nodes,
            learning_rate:     a.lr,
            batch_size:        a.batch_size,
            seed:              a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Weights path used during training
    #[arg(long, default_value = "model/model")]
    pub model_path: String,

    /// pandas-split JSON file with one multi-hot row per video
    #[arg(long, conflicts_with = "tags", required_unless_present = "tags")]
    pub input: Option<String>,

    /// Tags of a single video, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig { model_path: a.model_path, input: a.input, tags: a.tags }
    }
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Serving endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub url: String,

    /// JSON payload to send
    #[arg(long, default_value = "input.json")]
    pub input: String,
}

impl From<InvokeArgs> for InvokeConfig {
    fn from(a: InvokeArgs) -> Self {
        InvokeConfig { url: a.url, input: a.input }
    }
}

#[derive(Args, Debug)]
pub struct RunsArgs {
    #[arg(long, default_value = "mlruns")]
    pub tracking_dir: String,

    #[arg(long, default_value = "aia-deep-learning-sess-001")]
    pub experiment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["video-category-trainer", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(TrainConfig::from(args), TrainConfig::default());
    }

    #[test]
    fn test_predict_splits_tags_on_commas() {
        let cli = Cli::try_parse_from(["video-category-trainer", "predict", "--tags", "a,b"]).unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.tags, vec!["a", "b"]);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_predict_requires_some_input() {
        assert!(Cli::try_parse_from(["video-category-trainer", "predict"]).is_err());
    }

    #[test]
    fn test_invoke_defaults() {
        let cli = Cli::try_parse_from(["video-category-trainer", "invoke"]).unwrap();
        let Commands::Invoke(args) = cli.command else { panic!("expected invoke") };
        assert_eq!(args.url, DEFAULT_ENDPOINT);
        assert_eq!(args.input, "input.json");
    }
}
