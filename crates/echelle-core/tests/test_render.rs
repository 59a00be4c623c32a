use echelle_core::io::render::{save_frame, save_frame_sequence, save_png, save_tiff};
use ndarray::Array2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ramp(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32)
}

// ---------------------------------------------------------------------------
// save_png / save_tiff
// ---------------------------------------------------------------------------

#[test]
fn test_png_stretches_to_full_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.png");
    save_png(&ramp(4, 4), &path).unwrap();

    let img = image::open(&path).unwrap().to_luma8();
    assert_eq!(img.dimensions(), (4, 4));
    // Min maps to black, max to white regardless of detector units.
    assert_eq!(img.get_pixel(0, 0).0[0], 0);
    assert_eq!(img.get_pixel(3, 3).0[0], 255);
}

#[test]
fn test_png_constant_frame_is_mid_gray() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.png");
    save_png(&Array2::from_elem((4, 4), 1234.5f32), &path).unwrap();

    let img = image::open(&path).unwrap().to_luma8();
    assert_eq!(img.get_pixel(0, 0).0[0], 127);
    assert_eq!(img.get_pixel(3, 3).0[0], 127);
}

#[test]
fn test_tiff_preserves_16bit_extremes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.tif");
    save_tiff(&ramp(4, 4), &path).unwrap();

    let img = image::open(&path).unwrap().to_luma16();
    assert_eq!(img.dimensions(), (4, 4));
    assert_eq!(img.get_pixel(0, 0).0[0], 0);
    assert_eq!(img.get_pixel(3, 3).0[0], 65535);
}

#[test]
fn test_axis_order_matches_array() {
    // data[[row, col]] must land at image (x=col, y=row).
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corner.png");
    let mut data = Array2::<f32>::zeros((3, 5));
    data[[0, 4]] = 10.0;
    save_png(&data, &path).unwrap();

    let img = image::open(&path).unwrap().to_luma8();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(4, 0).0[0], 255);
    assert_eq!(img.get_pixel(0, 2).0[0], 0);
}

// ---------------------------------------------------------------------------
// save_frame — extension dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_save_frame_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let data = ramp(4, 4);

    for name in ["a.png", "b.tif", "c.tiff", "d.out"] {
        let path = dir.path().join(name);
        save_frame(&data, &path).unwrap();
        assert!(path.exists(), "{name} not written");
    }
    // Unknown extensions fall back to PNG content.
    let fallback = image::load(
        std::io::BufReader::new(std::fs::File::open(dir.path().join("d.out")).unwrap()),
        image::ImageFormat::Png,
    );
    assert!(fallback.is_ok());
}

// ---------------------------------------------------------------------------
// save_frame_sequence
// ---------------------------------------------------------------------------

#[test]
fn test_sequence_writes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let frames = vec![ramp(4, 4), ramp(4, 4), ramp(4, 4)];

    let written = save_frame_sequence(frames.iter(), "bias", dir.path()).unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(written[0], dir.path().join("bias_000.png"));
    assert_eq!(written[2], dir.path().join("bias_002.png"));
    for path in &written {
        assert!(path.exists());
    }
}

#[test]
fn test_sequence_empty_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let frames: Vec<Array2<f32>> = vec![];
    let written = save_frame_sequence(frames.iter(), "none", dir.path()).unwrap();
    assert!(written.is_empty());
}
