// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands: `train` and `check-data`.
//
// Every `train` flag defaults to the reference setup, so a
// bare `blstm-phoneme train` reproduces it exactly.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the BLSTM on <data-dir>/train, then score <data-dir>/test
    Train(TrainArgs),

    /// Load and validate every utterance file in a directory
    CheckData(CheckDataArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the `train` and `test` subdirectories
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Number of full passes through the training set
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// SGD learning rate
    #[arg(long, default_value_t = 1e-5)]
    pub lr: f64,

    /// Momentum coefficient
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// LSTM units per direction (the BLSTM output is twice this)
    #[arg(
        long,
        default_value_t = 93,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub hidden_size: usize,

    /// Number of leading utterances held out for validation
    #[arg(long, default_value_t = 184)]
    pub validation_size: usize,

    /// Seed for weight init and shuffling; random (and logged) if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append per-epoch metrics to this CSV file
    #[arg(long)]
    pub metrics_csv: Option<String>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:        a.data_dir,
            epochs:          a.epochs,
            lr:              a.lr,
            momentum:        a.momentum,
            hidden_size:     a.hidden_size,
            validation_size: a.validation_size,
            seed:            a.seed,
            metrics_csv:     a.metrics_csv,
        }
    }
}

/// All arguments for the `check-data` command
#[derive(Args, Debug)]
pub struct CheckDataArgs {
    /// Directory of .npz utterance files
    #[arg(long)]
    pub dir: String,
}
