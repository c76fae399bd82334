//! Collision Risk - fuzzy-logic conjunction assessment for satellite pairs
//!
//! Propagates two catalogued objects over one UTC day with SGP4, derives
//! separation, relative speed, orbital similarity and maneuverability at every
//! step, and writes a Mamdani-inferred risk category per step to CSV.

mod analysis;
mod classifier;
mod data;
mod error;
mod features;
mod fuzzy;
mod orbital;
mod output;
mod propagation;
mod simulation;

use anyhow::Result;
use clap::{Parser, Subcommand};

use analysis::{run_assessment, run_summary, AssessArgs, SummaryArgs};

#[derive(Parser)]
#[command(name = "collision-risk")]
#[command(author, version, about = "Fuzzy collision-risk assessment for two catalogued objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one day for a pair of objects and write the risk time series
    Assess(AssessArgs),
    /// Summarize a previously written result file
    Summary(SummaryArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Assess(args) => {
            let path = run_assessment(args)?;
            println!("Results saved to {}", path.display());
        }
        Commands::Summary(args) => run_summary(args)?,
    }

    Ok(())
}
