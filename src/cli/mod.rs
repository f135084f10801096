// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to Layer 2.
// Final results are printed here; everything else is
// delegated.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CheckDataArgs, Commands, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "blstm-phoneme",
    version,
    about = "Train a bidirectional LSTM framewise phoneme classifier on TIMIT-style .npz data."
)]
pub struct Cli {
    /// The subcommand to run (train or check-data)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => run_train(args),
            Commands::CheckData(args) => run_check_data(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on data in: {}", args.data_dir);

    let report = TrainUseCase::new(args.into()).execute()?;

    if let Some(acc) = report.final_val_accuracy {
        println!("Final validation accuracy: {:.4}", acc);
    }
    println!("Test accuracy: {:.4}", report.test_accuracy);
    println!("(seed {})", report.seed);
    Ok(())
}

fn run_check_data(args: CheckDataArgs) -> Result<()> {
    use crate::application::check_data_use_case::CheckDataUseCase;

    let summary = CheckDataUseCase::new(args.dir.clone()).execute()?;

    println!(
        "{}: {} utterances, {} frames (min {}, max {})",
        args.dir, summary.utterances, summary.frames, summary.min_frames, summary.max_frames,
    );
    Ok(())
}
