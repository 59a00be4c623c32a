/// Glob pattern matching FITS files inside a data root.
///
/// Deliberately loose: it accepts `.fits`, `.fts` and compressed
/// variants like `.fits.gz` in one pass.
pub const FITS_GLOB_PATTERN: &str = "*.f*ts*";

/// Minimum number of pixels in a frame before frame combination switches
/// to row-level parallelism. Smaller frames run sequentially since the
/// thread coordination overhead exceeds the work.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Decimal digits used when formatting statistical reports.
pub const REPORT_PRECISION: usize = 9;
