use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use echelle_core::frame::FrameClass;
use echelle_core::io::render::{save_frame, save_frame_sequence};
use echelle_core::sequence::config::{
    CalibrationConfig, ClassSelection, DarkCorrection, FlatCorrection,
};
use echelle_core::sequence::CalibrationSequence;

use crate::summary;

#[derive(Args)]
pub struct CalibrateArgs {
    /// Data directory containing FITS exposures
    pub dir: PathBuf,

    /// Calibration config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Subtract the super bias from darks and flats
    #[arg(long)]
    pub bias_subtract: bool,

    /// Subtract the super dark from flats
    #[arg(long)]
    pub dark_subtract: bool,

    /// Skip loading dark frames
    #[arg(long)]
    pub no_darks: bool,

    /// Skip loading wavecal frames
    #[arg(long)]
    pub no_wavecal: bool,

    /// Skip loading object frames
    #[arg(long)]
    pub no_objects: bool,

    /// Also render every loaded raw frame
    #[arg(long)]
    pub render_raw: bool,

    /// Output directory for rendered frames
    #[arg(short, long, default_value = "calibrated")]
    pub output: PathBuf,
}

pub fn run(args: &CalibrateArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid calibration config")?
    } else {
        build_config_from_args(args)
    };

    let mut sequence = CalibrationSequence::configure(&args.dir)?;
    summary::print_classification(sequence.classification(), false);

    let selected: Vec<FrameClass> = FrameClass::ALL
        .into_iter()
        .filter(|&class| config.load.selected(class))
        .collect();
    let total: usize = selected
        .iter()
        .map(|&class| sequence.classification().count(class))
        .sum();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Loading {msg:12} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    for &class in &selected {
        pb.set_message(class.to_string());
        sequence.load_frames(&ClassSelection::only(class))?;
        pb.inc(sequence.classification().count(class) as u64);
    }
    pb.finish_with_message("done");

    sequence.make_super_frames(&config)?;

    summary::print_section("Super frames");
    let supers = [
        sequence.super_bias(),
        sequence.super_dark(),
        sequence.super_blue_flat(),
        sequence.super_red_flat(),
    ];
    for super_frame in supers.into_iter().flatten() {
        summary::print_super_frame(super_frame);
    }
    println!();

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    for super_frame in supers.into_iter().flatten() {
        let file = format!("{}.png", super_frame.name.replace(' ', "_"));
        let path = args.output.join(file);
        save_frame(&super_frame.data, &path)?;
        println!("Saved {}", path.display());
    }

    if args.render_raw {
        for &class in &selected {
            let frames = sequence.frames(class);
            if frames.is_empty() {
                continue;
            }
            let stem = class.to_string().replace(' ', "_");
            let written = save_frame_sequence(
                frames.iter().map(|f| &f.data),
                &stem,
                &args.output,
            )?;
            println!("Saved {} {} frame(s)", written.len(), class);
        }
    }

    Ok(())
}

fn build_config_from_args(args: &CalibrateArgs) -> CalibrationConfig {
    CalibrationConfig {
        load: ClassSelection {
            dark: !args.no_darks,
            wavecal: !args.no_wavecal,
            object: !args.no_objects,
            ..ClassSelection::all()
        },
        dark: DarkCorrection {
            bias_subtract: args.bias_subtract,
        },
        flats: FlatCorrection {
            bias_subtract: args.bias_subtract,
            dark_subtract: args.dark_subtract,
        },
    }
}
