use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use echelle_core::frame::{FrameClass, SuperFrame};
use echelle_core::io::render::save_frame;
use echelle_core::sequence::config::{CalibrationConfig, ClassSelection, FlatCorrection};
use echelle_core::sequence::CalibrationSequence;
use echelle_core::stats::{central_region, grand_mean, t_test_independent, t_test_single_sample};

use crate::summary;

#[derive(Args)]
pub struct CompareArgs {
    /// Reference session data directory
    pub reference: PathBuf,

    /// Experiment session data directory
    pub experiment: PathBuf,

    /// Control session data directory
    #[arg(long)]
    pub control: Option<PathBuf>,

    /// Side of the central pixel box used for region statistics
    #[arg(long, default_value_t = 32)]
    pub box_size: usize,

    /// Output directory for difference frames
    #[arg(short, long, default_value = "comparison")]
    pub output: PathBuf,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    let config = comparison_config();

    summary::print_section("Sessions");
    summary::print_result("reference", args.reference.display());
    summary::print_result("experiment", args.experiment.display());
    if let Some(ref control) = args.control {
        summary::print_result("control", control.display());
    }

    let reference = load_session(&args.reference, &config)?;
    let experiment = load_session(&args.experiment, &config)?;
    let control = args
        .control
        .as_deref()
        .map(|dir| load_session(dir, &config))
        .transpose()?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    summary::print_section("Super frame differences");
    let reference_supers = session_supers(&reference, "reference")?;
    render_differences(&reference_supers, &experiment, "experiment", &args.output)?;
    if let Some(ref control) = control {
        render_differences(&reference_supers, control, "control", &args.output)?;
    }

    let reference_bias = reference.frames(FrameClass::Bias);
    let reference_mean = grand_mean(reference_bias.iter().map(|f| &f.data));

    summary::print_section("Bias vs reference session mean");
    let result = t_test_single_sample(reference_bias.iter().map(|f| &f.data), reference_mean)?;
    summary::print_result("reference", result);
    let result = t_test_single_sample(
        experiment.frames(FrameClass::Bias).iter().map(|f| &f.data),
        reference_mean,
    )?;
    summary::print_result("experiment", result);
    if let Some(ref control) = control {
        let result = t_test_single_sample(
            control.frames(FrameClass::Bias).iter().map(|f| &f.data),
            reference_mean,
        )?;
        summary::print_result("control", result);
    }

    summary::print_section(&format!("Central {0}x{0} bias region t-test", args.box_size));
    let regions = |sequence: &CalibrationSequence| {
        sequence
            .frames(FrameClass::Bias)
            .iter()
            .map(|f| central_region(&f.data, args.box_size))
            .collect::<Vec<_>>()
    };
    let reference_regions = regions(&reference);
    let experiment_regions = regions(&experiment);
    let result = t_test_independent(reference_regions.iter(), experiment_regions.iter())?;
    summary::print_result("experiment", result);
    if let Some(ref control) = control {
        let control_regions = regions(control);
        let result = t_test_independent(reference_regions.iter(), control_regions.iter())?;
        summary::print_result("control", result);
    }
    println!();

    Ok(())
}

/// Comparisons work on raw bias levels, so darks stay out of the flat
/// correction and object frames are never loaded.
fn comparison_config() -> CalibrationConfig {
    CalibrationConfig {
        load: ClassSelection {
            dark: false,
            object: false,
            ..ClassSelection::all()
        },
        flats: FlatCorrection {
            bias_subtract: true,
            dark_subtract: false,
        },
        ..Default::default()
    }
}

fn load_session(dir: &Path, config: &CalibrationConfig) -> Result<CalibrationSequence> {
    let mut sequence = CalibrationSequence::configure(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    sequence
        .run(config)
        .with_context(|| format!("Failed to calibrate {}", dir.display()))?;
    Ok(sequence)
}

fn session_supers<'a>(
    sequence: &'a CalibrationSequence,
    label: &str,
) -> Result<[&'a SuperFrame; 3]> {
    let bias = sequence
        .super_bias()
        .with_context(|| format!("{label} session produced no super bias"))?;
    let blue = sequence
        .super_blue_flat()
        .with_context(|| format!("{label} session produced no blue super flat"))?;
    let red = sequence
        .super_red_flat()
        .with_context(|| format!("{label} session produced no red super flat"))?;
    Ok([bias, blue, red])
}

fn render_differences(
    reference_supers: &[&SuperFrame; 3],
    session: &CalibrationSequence,
    suffix: &str,
    output: &Path,
) -> Result<()> {
    let others = session_supers(session, suffix)?;
    for (reference, other) in reference_supers.iter().zip(others) {
        let name = format!("{} {}", other.name, suffix);
        let difference = other.difference(reference, &name)?;
        let path = output.join(format!("{}.png", name.replace(' ', "_")));
        save_frame(&difference.data, &path)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}
