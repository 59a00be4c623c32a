mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "echelle", about = "Echelle spectrograph calibration toolkit")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the FITS exposures in a data directory
    Scan(commands::scan::ScanArgs),
    /// Build super calibration frames from a data directory
    Calibrate(commands::calibrate::CalibrateArgs),
    /// Statistically compare calibration sessions
    Compare(commands::compare::CompareArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Calibrate(args) => commands::calibrate::run(args),
        Commands::Compare(args) => commands::compare::run(args),
    }
}
