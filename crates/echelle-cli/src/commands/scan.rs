use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use echelle_core::classify::Classification;

use crate::summary;

#[derive(Args)]
pub struct ScanArgs {
    /// Data directory containing FITS exposures
    pub dir: PathBuf,

    /// List every file under its class
    #[arg(long)]
    pub files: bool,
}

pub fn run(args: &ScanArgs) -> Result<()> {
    let classification = Classification::scan(&args.dir)?;
    summary::print_classification(&classification, args.files);
    Ok(())
}
