use std::fmt;

use ndarray::Array2;

use crate::error::{EchelleError, Result};

/// Calibration class of an exposure, derived from its FITS header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameClass {
    Bias,
    Dark,
    BlueFlat,
    RedFlat,
    WaveCal,
    Object,
}

impl FrameClass {
    /// Every class, in load order.
    pub const ALL: [FrameClass; 6] = [
        FrameClass::Bias,
        FrameClass::Dark,
        FrameClass::BlueFlat,
        FrameClass::RedFlat,
        FrameClass::WaveCal,
        FrameClass::Object,
    ];
}

impl fmt::Display for FrameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameClass::Bias => "bias",
            FrameClass::Dark => "dark",
            FrameClass::BlueFlat => "blue flat",
            FrameClass::RedFlat => "red flat",
            FrameClass::WaveCal => "wavecal",
            FrameClass::Object => "object",
        };
        write!(f, "{name}")
    }
}

/// Header cards the pipeline consumes, decoded from the primary HDU.
///
/// Every field is optional: classification decides what to do about
/// missing cards, the decoder just reports what is there.
#[derive(Clone, Debug, Default)]
pub struct FrameHeader {
    pub image_type: Option<String>,
    pub filter: Option<String>,
    pub exposure_time: Option<f64>,
    pub date_obs: Option<String>,
}

/// A single decoded exposure.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel values in detector units, shape `(height, width)`.
    pub data: Array2<f32>,
    /// Header view of the file this frame came from.
    pub header: FrameHeader,
}

impl Frame {
    pub fn new(data: Array2<f32>, header: FrameHeader) -> Self {
        Self { data, header }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// How a super frame was reduced from its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineMethod {
    Median,
}

impl fmt::Display for CombineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineMethod::Median => write!(f, "median"),
        }
    }
}

/// A combined calibration frame with correction provenance.
///
/// The provenance flags record what actually happened when the frame was
/// built: `Some(true)` / `Some(false)` for a correction that was applied
/// or explicitly not applied, `None` when the question never arose (a
/// super bias, or a difference frame). They are set at construction and
/// cannot be changed afterwards, so downstream steps can trust them.
#[derive(Clone, Debug)]
pub struct SuperFrame {
    pub data: Array2<f32>,
    pub name: String,
    bias_subtracted: Option<bool>,
    dark_subtracted: Option<bool>,
    combine_method: CombineMethod,
}

impl SuperFrame {
    pub(crate) fn combined(
        data: Array2<f32>,
        name: impl Into<String>,
        bias_subtracted: Option<bool>,
        dark_subtracted: Option<bool>,
    ) -> Self {
        Self {
            data,
            name: name.into(),
            bias_subtracted,
            dark_subtracted,
            combine_method: CombineMethod::Median,
        }
    }

    /// Pixel-wise difference `self - other` of two equally shaped super
    /// frames. The result's correction provenance is unknown.
    pub fn difference(&self, other: &SuperFrame, name: impl Into<String>) -> Result<SuperFrame> {
        if self.data.dim() != other.data.dim() {
            return Err(EchelleError::ShapeMismatch {
                expected: self.data.dim(),
                got: other.data.dim(),
            });
        }
        Ok(SuperFrame {
            data: &self.data - &other.data,
            name: name.into(),
            bias_subtracted: None,
            dark_subtracted: None,
            combine_method: self.combine_method,
        })
    }

    pub fn bias_subtracted(&self) -> Option<bool> {
        self.bias_subtracted
    }

    pub fn dark_subtracted(&self) -> Option<bool> {
        self.dark_subtracted
    }

    pub fn combine_method(&self) -> CombineMethod {
        self.combine_method
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}
