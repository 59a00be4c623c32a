pub mod config;
mod calibration;

pub use calibration::{load_class, CalibrationSequence};
