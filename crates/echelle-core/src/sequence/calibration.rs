use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{info, warn};

use crate::classify::Classification;
use crate::error::{EchelleError, Result};
use crate::frame::{Frame, FrameClass, SuperFrame};
use crate::io::fits;
use crate::stack::median_combine;

use super::config::{CalibrationConfig, ClassSelection};

/// Load every file of one class, in list order.
///
/// An empty list is a typed error so callers can tell a configuration
/// problem apart from a decode failure. Any unreadable file fails the
/// whole call; by this point the files already classified cleanly, so a
/// decode failure means the data changed underneath us.
pub fn load_class(paths: &[PathBuf], class: FrameClass) -> Result<Vec<Frame>> {
    if paths.is_empty() {
        warn!("Configured {class} list is empty, nothing to load");
        return Err(EchelleError::EmptyClass(class));
    }

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let frame = fits::read_primary(path)?;
        info!(
            "Loading {} filter {} frame {}",
            frame.header.image_type.as_deref().unwrap_or("?"),
            frame.header.filter.as_deref().unwrap_or("?"),
            path.display()
        );
        frames.push(frame);
    }
    Ok(frames)
}

/// One acquisition session: classified files, loaded frames and the
/// super frames built from them.
///
/// Construction classifies the data root up front, so a value of this
/// type always holds a valid [`Classification`]. Frames load on demand
/// via [`load_frames`](Self::load_frames); each `make_*` operation
/// rebuilds its super frame from whatever is currently loaded.
#[derive(Debug)]
pub struct CalibrationSequence {
    classification: Classification,
    bias_frames: Vec<Frame>,
    dark_frames: Vec<Frame>,
    blue_flat_frames: Vec<Frame>,
    red_flat_frames: Vec<Frame>,
    wavecal_frames: Vec<Frame>,
    object_frames: Vec<Frame>,
    super_bias: Option<SuperFrame>,
    super_dark: Option<SuperFrame>,
    super_blue_flat: Option<SuperFrame>,
    super_red_flat: Option<SuperFrame>,
}

impl CalibrationSequence {
    /// Discover and classify `data_root`, producing a sequence with no
    /// frames loaded yet.
    pub fn configure(data_root: impl AsRef<Path>) -> Result<Self> {
        let classification = Classification::scan(data_root)?;
        Ok(Self {
            classification,
            bias_frames: Vec::new(),
            dark_frames: Vec::new(),
            blue_flat_frames: Vec::new(),
            red_flat_frames: Vec::new(),
            wavecal_frames: Vec::new(),
            object_frames: Vec::new(),
            super_bias: None,
            super_dark: None,
            super_blue_flat: None,
            super_red_flat: None,
        })
    }

    /// Load the selected classes, in the fixed [`FrameClass::ALL`] order.
    ///
    /// The first class that fails aborts the call; classes loaded before
    /// it keep their frames.
    pub fn load_frames(&mut self, selection: &ClassSelection) -> Result<()> {
        for class in FrameClass::ALL {
            if !selection.selected(class) {
                continue;
            }
            let frames = load_class(self.classification.class_list(class), class)?;
            *self.frames_mut(class) = frames;
        }
        Ok(())
    }

    /// Median-combine the loaded bias frames into the super bias.
    ///
    /// With no bias frames loaded this is a warning, not an error, and
    /// any existing super bias is left as it was.
    pub fn make_super_bias(&mut self) -> Result<()> {
        if self.bias_frames.is_empty() {
            warn!("Bias frame list is empty, super bias not generated");
            return Ok(());
        }
        let data = median_combine(self.bias_frames.iter().map(|f| &f.data), None)?;
        info!("Built super bias from {} frames", self.bias_frames.len());
        self.super_bias = Some(SuperFrame::combined(data, "super bias", None, None));
        Ok(())
    }

    /// Median-combine the loaded dark frames, optionally subtracting the
    /// super bias from each dark first.
    ///
    /// Requires [`make_super_bias`](Self::make_super_bias) to have run
    /// when `bias_subtract` is set.
    pub fn make_super_dark(&mut self, bias_subtract: bool) -> Result<()> {
        if self.dark_frames.is_empty() {
            warn!("Dark frame list is empty, super dark not generated");
            return Ok(());
        }
        let correction = match bias_subtract {
            true => Some(&self.require_super_bias()?.data),
            false => None,
        };
        let data = median_combine(self.dark_frames.iter().map(|f| &f.data), correction)?;
        info!("Built super dark from {} frames", self.dark_frames.len());
        self.super_dark = Some(SuperFrame::combined(
            data,
            "super dark",
            Some(bias_subtract),
            None,
        ));
        Ok(())
    }

    /// Median-combine the loaded blue flat frames with the configured
    /// corrections.
    pub fn make_blue_super_flat(&mut self, bias_subtract: bool, dark_subtract: bool) -> Result<()> {
        if let Some(frame) = self.make_super_flat(
            FrameClass::BlueFlat,
            "blue super flat",
            bias_subtract,
            dark_subtract,
        )? {
            self.super_blue_flat = Some(frame);
        }
        Ok(())
    }

    /// Median-combine the loaded red flat frames with the configured
    /// corrections.
    pub fn make_red_super_flat(&mut self, bias_subtract: bool, dark_subtract: bool) -> Result<()> {
        if let Some(frame) = self.make_super_flat(
            FrameClass::RedFlat,
            "red super flat",
            bias_subtract,
            dark_subtract,
        )? {
            self.super_red_flat = Some(frame);
        }
        Ok(())
    }

    /// Build every super frame the config's loaded classes support.
    pub fn make_super_frames(&mut self, config: &CalibrationConfig) -> Result<()> {
        if config.load.bias {
            self.make_super_bias()?;
        }
        if config.load.dark {
            self.make_super_dark(config.dark.bias_subtract)?;
        }
        if config.load.blue_flat {
            self.make_blue_super_flat(config.flats.bias_subtract, config.flats.dark_subtract)?;
        }
        if config.load.red_flat {
            self.make_red_super_flat(config.flats.bias_subtract, config.flats.dark_subtract)?;
        }
        Ok(())
    }

    /// Load and combine everything `config` selects, in one call.
    pub fn run(&mut self, config: &CalibrationConfig) -> Result<()> {
        self.load_frames(&config.load)?;
        self.make_super_frames(config)
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Loaded frames of one class. Empty until
    /// [`load_frames`](Self::load_frames) selects it.
    pub fn frames(&self, class: FrameClass) -> &[Frame] {
        match class {
            FrameClass::Bias => &self.bias_frames,
            FrameClass::Dark => &self.dark_frames,
            FrameClass::BlueFlat => &self.blue_flat_frames,
            FrameClass::RedFlat => &self.red_flat_frames,
            FrameClass::WaveCal => &self.wavecal_frames,
            FrameClass::Object => &self.object_frames,
        }
    }

    pub fn super_bias(&self) -> Option<&SuperFrame> {
        self.super_bias.as_ref()
    }

    pub fn super_dark(&self) -> Option<&SuperFrame> {
        self.super_dark.as_ref()
    }

    pub fn super_blue_flat(&self) -> Option<&SuperFrame> {
        self.super_blue_flat.as_ref()
    }

    pub fn super_red_flat(&self) -> Option<&SuperFrame> {
        self.super_red_flat.as_ref()
    }

    fn frames_mut(&mut self, class: FrameClass) -> &mut Vec<Frame> {
        match class {
            FrameClass::Bias => &mut self.bias_frames,
            FrameClass::Dark => &mut self.dark_frames,
            FrameClass::BlueFlat => &mut self.blue_flat_frames,
            FrameClass::RedFlat => &mut self.red_flat_frames,
            FrameClass::WaveCal => &mut self.wavecal_frames,
            FrameClass::Object => &mut self.object_frames,
        }
    }

    fn make_super_flat(
        &self,
        class: FrameClass,
        name: &'static str,
        bias_subtract: bool,
        dark_subtract: bool,
    ) -> Result<Option<SuperFrame>> {
        let frames = self.frames(class);
        if frames.is_empty() {
            warn!("{class} frame list is empty, {name} not generated");
            return Ok(None);
        }
        let correction = self.flat_correction(bias_subtract, dark_subtract)?;
        let data = median_combine(frames.iter().map(|f| &f.data), correction.as_ref())?;
        info!("Built {name} from {} frames", frames.len());
        Ok(Some(SuperFrame::combined(
            data,
            name,
            Some(bias_subtract),
            Some(dark_subtract),
        )))
    }

    /// Correction frame for flat combination per the two flags.
    ///
    /// With both flags set the correction is `super dark - super bias`,
    /// which only removes the bias level once if the super dark still
    /// contains it. A bias-subtracted super dark is refused.
    fn flat_correction(
        &self,
        bias_subtract: bool,
        dark_subtract: bool,
    ) -> Result<Option<Array2<f32>>> {
        match (bias_subtract, dark_subtract) {
            (false, false) => Ok(None),
            (true, false) => Ok(Some(self.require_super_bias()?.data.clone())),
            (false, true) => Ok(Some(self.require_super_dark()?.data.clone())),
            (true, true) => {
                let dark = self.require_super_dark()?;
                if dark.bias_subtracted() == Some(true) {
                    return Err(EchelleError::DarkAlreadyBiasSubtracted);
                }
                let bias = self.require_super_bias()?;
                if dark.data.dim() != bias.data.dim() {
                    return Err(EchelleError::ShapeMismatch {
                        expected: dark.data.dim(),
                        got: bias.data.dim(),
                    });
                }
                Ok(Some(&dark.data - &bias.data))
            }
        }
    }

    fn require_super_bias(&self) -> Result<&SuperFrame> {
        self.super_bias
            .as_ref()
            .ok_or(EchelleError::MissingSuperFrame("super bias"))
    }

    fn require_super_dark(&self) -> Result<&SuperFrame> {
        self.super_dark
            .as_ref()
            .ok_or(EchelleError::MissingSuperFrame("super dark"))
    }
}
