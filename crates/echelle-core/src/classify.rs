use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::consts::FITS_GLOB_PATTERN;
use crate::error::{EchelleError, Result};
use crate::frame::{FrameClass, FrameHeader};
use crate::io::fits;

/// Find candidate FITS files under `data_root`, in alphabetical order.
///
/// Fails if the root is not a directory or matches nothing at all; a
/// directory with zero exposures is a configuration mistake, not an
/// empty result.
pub fn discover(data_root: &Path) -> Result<Vec<PathBuf>> {
    if !data_root.is_dir() {
        return Err(EchelleError::NotADirectory(data_root.to_path_buf()));
    }

    let pattern = data_root.join(FITS_GLOB_PATTERN);
    debug!("Searching with pattern {}", pattern.display());

    let mut files = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        files.push(entry.map_err(glob::GlobError::into_error)?);
    }
    if files.is_empty() {
        return Err(EchelleError::NoFitsFiles(data_root.to_path_buf()));
    }

    info!("Found {} FITS files in {}", files.len(), data_root.display());
    Ok(files)
}

/// Why a candidate file landed in no class list.
#[derive(Clone, Debug)]
pub enum SkipReason {
    /// The file could not be opened or decoded.
    Unreadable(String),
    /// A header card the classifier depends on is absent.
    MissingCard(&'static str),
    /// IMAGETYP holds a value outside the calibration vocabulary.
    UnknownImageType(String),
    /// A flat exposure with a FILTER value that maps to no flat class.
    UnknownFilter(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(reason) => write!(f, "unreadable: {reason}"),
            SkipReason::MissingCard(card) => write!(f, "missing header card {card}"),
            SkipReason::UnknownImageType(value) => {
                write!(f, "unknown IMAGETYP value {value:?}")
            }
            SkipReason::UnknownFilter(value) => {
                write!(f, "unknown FILTER value {value:?} for a flat")
            }
        }
    }
}

/// A candidate file excluded from every class, with the recorded reason.
#[derive(Clone, Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Partition of a data root's FITS files into calibration classes.
///
/// Built by [`scan`](Classification::scan) or
/// [`classify`](Classification::classify) and immutable afterwards.
/// Every candidate lands in exactly one class list or in the skipped
/// list, so the per-class counts plus skips always add up to the total.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    data_root: PathBuf,
    bias: Vec<PathBuf>,
    dark: Vec<PathBuf>,
    blue_flat: Vec<PathBuf>,
    red_flat: Vec<PathBuf>,
    wavecal: Vec<PathBuf>,
    object: Vec<PathBuf>,
    skipped: Vec<SkippedFile>,
}

impl Classification {
    /// Discover and classify every FITS file under `data_root`.
    pub fn scan(data_root: impl AsRef<Path>) -> Result<Self> {
        let data_root = data_root.as_ref();
        let files = discover(data_root)?;
        let mut result = Self::classify(files);
        result.data_root = data_root.to_path_buf();
        result.log_counts();
        Ok(result)
    }

    /// Partition candidate paths by their (IMAGETYP, FILTER) header view.
    ///
    /// Unreadable files and unknown metadata are never fatal here: the
    /// file is skipped with a warning and a recorded reason, and the
    /// remaining candidates still classify.
    pub fn classify(candidates: Vec<PathBuf>) -> Self {
        let mut result = Classification::default();
        for path in candidates {
            match fits::read_header(&path) {
                Ok(header) => result.place(path, &header),
                Err(e) => {
                    warn!("Skipping {}: {e}", path.display());
                    result.skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::Unreadable(e.to_string()),
                    });
                }
            }
        }
        result
    }

    fn place(&mut self, path: PathBuf, header: &FrameHeader) {
        match classify_header(header) {
            Ok(class) => self.class_list_mut(class).push(path),
            Err(reason) => {
                warn!("Skipping {}: {reason}", path.display());
                self.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    /// Directory the classification was built from. Empty when built
    /// directly from a path list.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Paths classified into `class`, in discovery order.
    pub fn class_list(&self, class: FrameClass) -> &[PathBuf] {
        match class {
            FrameClass::Bias => &self.bias,
            FrameClass::Dark => &self.dark,
            FrameClass::BlueFlat => &self.blue_flat,
            FrameClass::RedFlat => &self.red_flat,
            FrameClass::WaveCal => &self.wavecal,
            FrameClass::Object => &self.object,
        }
    }

    fn class_list_mut(&mut self, class: FrameClass) -> &mut Vec<PathBuf> {
        match class {
            FrameClass::Bias => &mut self.bias,
            FrameClass::Dark => &mut self.dark,
            FrameClass::BlueFlat => &mut self.blue_flat,
            FrameClass::RedFlat => &mut self.red_flat,
            FrameClass::WaveCal => &mut self.wavecal,
            FrameClass::Object => &mut self.object,
        }
    }

    /// Files excluded from every class.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn count(&self, class: FrameClass) -> usize {
        self.class_list(class).len()
    }

    /// Total number of candidates seen, classified or skipped.
    pub fn total(&self) -> usize {
        let classified: usize = FrameClass::ALL.iter().map(|&c| self.count(c)).sum();
        classified + self.skipped.len()
    }

    fn log_counts(&self) {
        info!(
            "Classified {} files under {}",
            self.total(),
            self.data_root.display()
        );
        for class in FrameClass::ALL {
            info!("Found {} {} frames", self.count(class), class);
        }
        if !self.skipped.is_empty() {
            info!("Skipped {} files", self.skipped.len());
        }
    }
}

/// Map a header view onto a frame class.
///
/// IMAGETYP and FILTER comparisons are case-insensitive. Both cards must
/// be present before any value is considered; FILTER only disambiguates
/// flats but its absence disqualifies every class.
fn classify_header(header: &FrameHeader) -> std::result::Result<FrameClass, SkipReason> {
    let image_type = header
        .image_type
        .as_deref()
        .ok_or(SkipReason::MissingCard("IMAGETYP"))?;
    let filter = header
        .filter
        .as_deref()
        .ok_or(SkipReason::MissingCard("FILTER"))?;

    match image_type.to_ascii_uppercase().as_str() {
        "ZERO" => Ok(FrameClass::Bias),
        "DARK" => Ok(FrameClass::Dark),
        "COMP" => Ok(FrameClass::WaveCal),
        "OBJECT" => Ok(FrameClass::Object),
        "FLAT" => match filter.to_ascii_uppercase().as_str() {
            "BLUE" => Ok(FrameClass::BlueFlat),
            "OPEN" => Ok(FrameClass::RedFlat),
            _ => Err(SkipReason::UnknownFilter(filter.to_string())),
        },
        _ => Err(SkipReason::UnknownImageType(image_type.to_string())),
    }
}
