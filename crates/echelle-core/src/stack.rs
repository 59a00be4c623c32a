use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{EchelleError, Result};

/// Combine frames by computing the median at each pixel position,
/// optionally subtracting a correction frame from every input first.
///
/// The median keeps single-frame outliers (cosmic ray hits, hot pixels)
/// out of the combined result, which is why calibration frames are
/// median combined rather than averaged. Uses `select_nth_unstable` for
/// O(n) median without full sort. Parallelizes at the row level for
/// images >= 256x256.
pub fn median_combine<'a, I>(frames: I, correction: Option<&Array2<f32>>) -> Result<Array2<f32>>
where
    I: IntoIterator<Item = &'a Array2<f32>>,
{
    let frames: Vec<&Array2<f32>> = frames.into_iter().collect();
    if frames.is_empty() {
        return Err(EchelleError::EmptySequence);
    }

    let (h, w) = frames[0].dim();
    for frame in &frames {
        if frame.dim() != (h, w) {
            return Err(EchelleError::ShapeMismatch {
                expected: (h, w),
                got: frame.dim(),
            });
        }
    }
    if let Some(c) = correction {
        if c.dim() != (h, w) {
            return Err(EchelleError::ShapeMismatch {
                expected: (h, w),
                got: c.dim(),
            });
        }
    }

    let n = frames.len();

    if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        // Row-parallel: each row allocates its own pixel_values
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| combine_row(&frames, correction, row, w))
            .collect();

        let mut result = Array2::<f32>::zeros((h, w));
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        Ok(result)
    } else {
        // Sequential for small images
        let mut result = Array2::<f32>::zeros((h, w));
        for row in 0..h {
            let row_data = combine_row(&frames, correction, row, w);
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        Ok(result)
    }
}

fn combine_row(
    frames: &[&Array2<f32>],
    correction: Option<&Array2<f32>>,
    row: usize,
    w: usize,
) -> Vec<f32> {
    let n = frames.len();
    let mut pixel_values = vec![0.0f32; n];
    let mut row_result = vec![0.0f32; w];
    for (col, result) in row_result.iter_mut().enumerate() {
        for (i, frame) in frames.iter().enumerate() {
            pixel_values[i] = frame[[row, col]];
        }
        if let Some(c) = correction {
            let offset = c[[row, col]];
            for v in pixel_values.iter_mut() {
                *v -= offset;
            }
        }
        *result = compute_median(&mut pixel_values, n);
    }
    row_result
}

fn compute_median(pixel_values: &mut [f32], n: usize) -> f32 {
    if n == 1 {
        pixel_values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *pixel_values
            .select_nth_unstable_by(mid, |a, b| a.total_cmp(b))
            .1
    } else {
        let mid = n / 2;
        pixel_values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        pixel_values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (pixel_values[mid - 1] + pixel_values[mid]) / 2.0
    }
}
