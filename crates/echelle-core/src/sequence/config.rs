use serde::{Deserialize, Serialize};

use crate::frame::FrameClass;

/// Everything needed to turn a data root into super calibration frames.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub load: ClassSelection,
    #[serde(default)]
    pub dark: DarkCorrection,
    #[serde(default)]
    pub flats: FlatCorrection,
}

/// Which calibration classes to load from a sequence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSelection {
    pub bias: bool,
    pub dark: bool,
    pub blue_flat: bool,
    pub red_flat: bool,
    pub wavecal: bool,
    pub object: bool,
}

impl Default for ClassSelection {
    fn default() -> Self {
        Self {
            bias: true,
            dark: true,
            blue_flat: true,
            red_flat: true,
            wavecal: true,
            object: true,
        }
    }
}

impl ClassSelection {
    /// Every class enabled.
    pub fn all() -> Self {
        Self::default()
    }

    /// Nothing enabled.
    pub fn none() -> Self {
        Self {
            bias: false,
            dark: false,
            blue_flat: false,
            red_flat: false,
            wavecal: false,
            object: false,
        }
    }

    /// A single class enabled.
    pub fn only(class: FrameClass) -> Self {
        let mut selection = Self::none();
        selection.set(class, true);
        selection
    }

    pub fn set(&mut self, class: FrameClass, enabled: bool) {
        match class {
            FrameClass::Bias => self.bias = enabled,
            FrameClass::Dark => self.dark = enabled,
            FrameClass::BlueFlat => self.blue_flat = enabled,
            FrameClass::RedFlat => self.red_flat = enabled,
            FrameClass::WaveCal => self.wavecal = enabled,
            FrameClass::Object => self.object = enabled,
        }
    }

    pub fn selected(&self, class: FrameClass) -> bool {
        match class {
            FrameClass::Bias => self.bias,
            FrameClass::Dark => self.dark,
            FrameClass::BlueFlat => self.blue_flat,
            FrameClass::RedFlat => self.red_flat,
            FrameClass::WaveCal => self.wavecal,
            FrameClass::Object => self.object,
        }
    }
}

/// Correction applied while combining dark frames.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DarkCorrection {
    pub bias_subtract: bool,
}

/// Corrections applied while combining flat frames.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatCorrection {
    pub bias_subtract: bool,
    pub dark_subtract: bool,
}
