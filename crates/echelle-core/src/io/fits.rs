use std::path::Path;

use fitrs::{Fits, FitsData, Hdu, HeaderValue};
use ndarray::Array2;
use tracing::debug;

use crate::error::{EchelleError, Result};
use crate::frame::{Frame, FrameHeader};

/// Decode the primary HDU of a FITS file into a [`Frame`].
///
/// All integer and floating point image layouts are accepted and widened
/// or narrowed to `f32`. Blanked integer samples decode as NaN. The FITS
/// axis convention (NAXIS1 varies fastest) maps onto a row-major array of
/// shape `(height, width)`.
pub fn read_primary(path: &Path) -> Result<Frame> {
    let fits = open(path)?;
    let hdu = primary_hdu(&fits, path)?;
    let header = header_view(&hdu);
    debug!(
        "Decoded {}: IMAGETYP={:?} FILTER={:?}",
        path.display(),
        header.image_type,
        header.filter
    );
    let data = image_data(&hdu, path)?;
    Ok(Frame::new(data, header))
}

/// Decode only the primary header of a FITS file.
///
/// Cheaper than [`read_primary`] when the pixels are not needed, e.g.
/// while classifying a directory.
pub fn read_header(path: &Path) -> Result<FrameHeader> {
    let fits = open(path)?;
    let hdu = primary_hdu(&fits, path)?;
    Ok(header_view(&hdu))
}

fn open(path: &Path) -> Result<Fits> {
    Fits::open(path).map_err(|e| EchelleError::InvalidFits {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn primary_hdu(fits: &Fits, path: &Path) -> Result<Hdu> {
    fits.get(0).ok_or_else(|| EchelleError::MissingPrimaryHdu {
        path: path.to_path_buf(),
    })
}

fn header_view(hdu: &Hdu) -> FrameHeader {
    FrameHeader {
        image_type: string_card(hdu, "IMAGETYP"),
        filter: string_card(hdu, "FILTER"),
        exposure_time: float_card(hdu, "EXPTIME"),
        date_obs: string_card(hdu, "DATE-OBS"),
    }
}

fn string_card(hdu: &Hdu, key: &str) -> Option<String> {
    match hdu.value(key) {
        // FITS pads string values; trailing blanks are not significant.
        Some(HeaderValue::CharacterString(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn float_card(hdu: &Hdu, key: &str) -> Option<f64> {
    match hdu.value(key) {
        Some(HeaderValue::RealFloatingNumber(v)) => Some(*v),
        Some(HeaderValue::IntegerNumber(v)) => Some(*v as f64),
        _ => None,
    }
}

fn image_data(hdu: &Hdu, path: &Path) -> Result<Array2<f32>> {
    match hdu.read_data() {
        FitsData::Characters(arr) => {
            let data = arr.data.iter().map(|&c| c as u32 as f32).collect();
            to_array(&arr.shape, data, path)
        }
        FitsData::IntegersI32(arr) => {
            let data = arr
                .data
                .iter()
                .map(|v| v.map_or(f32::NAN, |v| v as f32))
                .collect();
            to_array(&arr.shape, data, path)
        }
        FitsData::IntegersU32(arr) => {
            let data = arr
                .data
                .iter()
                .map(|v| v.map_or(f32::NAN, |v| v as f32))
                .collect();
            to_array(&arr.shape, data, path)
        }
        FitsData::FloatingPoint32(arr) => to_array(&arr.shape, arr.data.clone(), path),
        FitsData::FloatingPoint64(arr) => {
            let data = arr.data.iter().map(|&v| v as f32).collect();
            to_array(&arr.shape, data, path)
        }
    }
}

fn to_array(shape: &[usize], data: Vec<f32>, path: &Path) -> Result<Array2<f32>> {
    if shape.len() != 2 {
        return Err(EchelleError::NotTwoDimensional {
            path: path.to_path_buf(),
            axes: shape.len(),
        });
    }
    // shape[0] is NAXIS1 (width), shape[1] is NAXIS2 (height).
    let (width, height) = (shape[0], shape[1]);
    Array2::from_shape_vec((height, width), data).map_err(|e| EchelleError::InvalidFits {
        path: path.to_path_buf(),
        reason: format!("data does not match declared axes: {e}"),
    })
}
