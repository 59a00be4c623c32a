use std::path::PathBuf;

use thiserror::Error;

use crate::frame::FrameClass;

/// Errors that can occur during calibration processing.
#[derive(Error, Debug)]
pub enum EchelleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("No FITS files found in {0}")]
    NoFitsFiles(PathBuf),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{path}: not a readable FITS file: {reason}")]
    InvalidFits { path: PathBuf, reason: String },

    #[error("{path}: no primary HDU")]
    MissingPrimaryHdu { path: PathBuf },

    #[error("{path}: expected a 2D image, got {axes} axis(es)")]
    NotTwoDimensional { path: PathBuf, axes: usize },

    #[error("Configured {0} list is empty")]
    EmptyClass(FrameClass),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Frame shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Missing prerequisite super frame: {0}")]
    MissingSuperFrame(&'static str),

    #[error("Super dark is already bias subtracted; combining it with the super bias would remove the bias level twice")]
    DarkAlreadyBiasSubtracted,

    #[error("Not enough frames for a t-test (degrees of freedom = {0})")]
    DegreesOfFreedom(usize),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

/// Convenience result type for calibration operations.
pub type Result<T> = std::result::Result<T, EchelleError>;
