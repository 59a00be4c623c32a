#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// FITS block size; headers and data units pad to a multiple of this.
pub const FITS_BLOCK: usize = 2880;

/// Append one 80-character header record, blank padded.
pub fn push_card(buf: &mut Vec<u8>, card: &str) {
    let mut record = [b' '; 80];
    let bytes = card.as_bytes();
    assert!(bytes.len() <= 80, "card too long: {card}");
    record[..bytes.len()].copy_from_slice(bytes);
    buf.extend_from_slice(&record);
}

/// Append a fixed-format card: 8-char keyword, `= `, value right
/// justified so it ends at column 30.
pub fn push_value_card(buf: &mut Vec<u8>, key: &str, value: &str) {
    push_card(buf, &format!("{key:<8}= {value:>20}"));
}

/// Append a string-valued card; the opening quote sits at column 11.
pub fn push_string_card(buf: &mut Vec<u8>, key: &str, value: &str) {
    push_card(buf, &format!("{key:<8}= '{value:<8}'"));
}

/// Pad to the next FITS block boundary with the given byte.
pub fn pad_block(buf: &mut Vec<u8>, fill: u8) {
    while buf.len() % FITS_BLOCK != 0 {
        buf.push(fill);
    }
}

/// Build a minimal single-HDU FITS image: 16-bit signed integer pixels,
/// big-endian, NAXIS1 = width varying fastest.
///
/// `image_type` and `filter` are optional so header-card absence can be
/// exercised; when present they become IMAGETYP and FILTER cards.
pub fn build_fits(
    width: usize,
    height: usize,
    image_type: Option<&str>,
    filter: Option<&str>,
    pixels: &[i16],
) -> Vec<u8> {
    assert_eq!(pixels.len(), width * height);
    let mut buf = Vec::new();

    push_value_card(&mut buf, "SIMPLE", "T");
    push_value_card(&mut buf, "BITPIX", "16");
    push_value_card(&mut buf, "NAXIS", "2");
    push_value_card(&mut buf, "NAXIS1", &width.to_string());
    push_value_card(&mut buf, "NAXIS2", &height.to_string());
    if let Some(image_type) = image_type {
        push_string_card(&mut buf, "IMAGETYP", image_type);
    }
    if let Some(filter) = filter {
        push_string_card(&mut buf, "FILTER", filter);
    }
    push_value_card(&mut buf, "EXPTIME", "1.5");
    push_string_card(&mut buf, "DATE-OBS", "2024-11-02");
    push_card(&mut buf, "END");
    pad_block(&mut buf, b' ');

    for &v in pixels {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    pad_block(&mut buf, 0);
    buf
}

/// Write a synthetic exposure into `dir` with every pixel set to `fill`.
pub fn write_fits(
    dir: &Path,
    name: &str,
    image_type: Option<&str>,
    filter: Option<&str>,
    width: usize,
    height: usize,
    fill: i16,
) -> PathBuf {
    let pixels = vec![fill; width * height];
    write_fits_pixels(dir, name, image_type, filter, width, height, &pixels)
}

/// Write a synthetic exposure into `dir` with explicit pixel values.
pub fn write_fits_pixels(
    dir: &Path,
    name: &str,
    image_type: Option<&str>,
    filter: Option<&str>,
    width: usize,
    height: usize,
    pixels: &[i16],
) -> PathBuf {
    let data = build_fits(width, height, image_type, filter, pixels);
    let path = dir.join(name);
    let mut file = File::create(&path).expect("create FITS file");
    file.write_all(&data).expect("write FITS data");
    path
}

/// Write a small complete calibration set into `dir`:
/// 3 biases (10, 12, 14), 2 darks (20, 30), 2 blue flats (40, 60),
/// 2 red flats (50, 70), 1 wavecal and 1 object frame, all 4x4.
pub fn write_cal_set(dir: &Path) {
    write_fits(dir, "bias_a.fits", Some("zero"), Some("Open"), 4, 4, 10);
    write_fits(dir, "bias_b.fits", Some("zero"), Some("Open"), 4, 4, 12);
    write_fits(dir, "bias_c.fits", Some("zero"), Some("Open"), 4, 4, 14);
    write_fits(dir, "dark_a.fits", Some("dark"), Some("Open"), 4, 4, 20);
    write_fits(dir, "dark_b.fits", Some("dark"), Some("Open"), 4, 4, 30);
    write_fits(dir, "flat_blue_a.fits", Some("flat"), Some("Blue"), 4, 4, 40);
    write_fits(dir, "flat_blue_b.fits", Some("flat"), Some("Blue"), 4, 4, 60);
    write_fits(dir, "flat_red_a.fits", Some("flat"), Some("Open"), 4, 4, 50);
    write_fits(dir, "flat_red_b.fits", Some("flat"), Some("Open"), 4, 4, 70);
    write_fits(dir, "comp_a.fits", Some("comp"), Some("Open"), 4, 4, 80);
    write_fits(dir, "object_a.fits", Some("object"), Some("Open"), 4, 4, 90);
}
