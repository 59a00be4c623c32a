use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::Result;

/// Save pixel data as 16-bit grayscale TIFF.
///
/// Detector units carry no fixed scale, so values are min-max stretched
/// to the output range. A constant frame renders as mid gray.
pub fn save_tiff(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let (lo, span) = value_range(data);

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w);
    for row in 0..h {
        for col in 0..w {
            let norm = normalize(data[[row, col]], lo, span);
            pixels.push((norm * 65535.0) as u16);
        }
    }

    let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save(path)?;
    Ok(())
}

/// Save pixel data as 8-bit grayscale PNG, min-max stretched.
pub fn save_png(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let (lo, span) = value_range(data);

    let mut img = GrayImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let norm = normalize(data[[row, col]], lo, span);
            img.put_pixel(col as u32, row as u32, Luma([(norm * 255.0) as u8]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save pixel data, choosing format from file extension.
pub fn save_frame(data: &Array2<f32>, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_tiff(data, path),
        Some("png") => save_png(data, path),
        _ => save_png(data, path),
    }
}

/// Save an ordered set of frames as numbered PNG files in `dir`.
///
/// Files are named `{stem}_{index:03}.png`; the written paths are
/// returned in order.
pub fn save_frame_sequence<'a, I>(frames: I, stem: &str, dir: &Path) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a Array2<f32>>,
{
    let mut written = Vec::new();
    for (index, data) in frames.into_iter().enumerate() {
        let path = dir.join(format!("{stem}_{index:03}.png"));
        save_png(data, &path)?;
        written.push(path);
    }
    Ok(written)
}

fn value_range(data: &Array2<f32>) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in data.iter() {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    (lo, hi - lo)
}

fn normalize(value: f32, lo: f32, span: f32) -> f32 {
    if span > 0.0 {
        ((value - lo) / span).clamp(0.0, 1.0)
    } else {
        0.5
    }
}
