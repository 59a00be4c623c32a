use std::f64::consts::PI;

use echelle_core::error::EchelleError;
use echelle_core::stats::{
    central_region, grand_mean, t_test_independent, t_test_single_sample,
};
use ndarray::Array2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 2x2 frame [a, a, b, b]: mean (a+b)/2, population variance ((b-a)/2)^2.
fn split_frame(a: f32, b: f32) -> Array2<f32> {
    Array2::from_shape_vec((2, 2), vec![a, a, b, b]).unwrap()
}

fn ramp_frame(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32)
}

// ---------------------------------------------------------------------------
// t_test_single_sample
// ---------------------------------------------------------------------------

#[test]
fn test_single_sample_zero_when_mean_matches_reference() {
    // Frame means 1 and 3 average to 2; both frames have nonzero spread.
    let population = vec![split_frame(0.0, 2.0), split_frame(2.0, 4.0)];
    let result = t_test_single_sample(population.iter(), 2.0).unwrap();
    assert_eq!(result.t, 0.0);
    assert!((result.p - 1.0).abs() < 1e-12);
    assert_eq!(result.df, 1);
    assert!((result.mean - 2.0).abs() < 1e-12);
}

#[test]
fn test_single_sample_hand_computed() {
    // Frame A: values {1, 3}, mean 2, variance 1.
    // Frame B: values {2, 6}, mean 4, variance 4.
    // Weighted pooled variance: (1*4 + 4*4) / 8 / 2 = 1.25.
    // Mean of means 3, reference 0: t = 3 / sqrt(1.25).
    let population = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let result = t_test_single_sample(population.iter(), 0.0).unwrap();

    let expected_std = 1.25f64.sqrt();
    let expected_t = 3.0 / expected_std;
    assert!((result.pooled_std - expected_std).abs() < 1e-12);
    assert!((result.t - expected_t).abs() < 1e-12);
    assert_eq!(result.df, 1);
    assert!((result.mean - 3.0).abs() < 1e-12);
    assert_eq!(result.reference, 0.0);

    // With one degree of freedom the Student-t is a Cauchy, so the
    // two-tailed p has a closed form to check the CDF wiring against.
    let expected_p = 1.0 - 2.0 * expected_t.atan() / PI;
    assert!((result.p - expected_p).abs() < 1e-9);
}

#[test]
fn test_single_sample_weights_frames_by_size() {
    // A 2x2 frame (mean 1, var 1) and a 4x4 frame (mean 2, var 4).
    // Weighted pooled variance: (1*4 + 4*16) / 20 / 2 = 1.7.
    let small = split_frame(0.0, 2.0);
    let mut large = Array2::<f32>::zeros((4, 4));
    for row in 2..4 {
        for col in 0..4 {
            large[[row, col]] = 4.0;
        }
    }
    let population = vec![small, large];
    let result = t_test_single_sample(population.iter(), 0.0).unwrap();

    let expected_std = 1.7f64.sqrt();
    assert!((result.pooled_std - expected_std).abs() < 1e-12);
    assert!((result.mean - 1.5).abs() < 1e-12);
    assert!((result.t - 1.5 / expected_std).abs() < 1e-12);
}

#[test]
fn test_single_sample_larger_offset_means_smaller_p() {
    let population = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let near = t_test_single_sample(population.iter(), 2.5).unwrap();
    let far = t_test_single_sample(population.iter(), 40.0).unwrap();
    assert!(far.t > near.t);
    assert!(far.p < near.p);
    assert!(near.p > 0.0 && near.p < 1.0);
}

#[test]
fn test_single_sample_empty_population() {
    let population: Vec<Array2<f32>> = vec![];
    let err = t_test_single_sample(population.iter(), 0.0).unwrap_err();
    assert!(matches!(err, EchelleError::EmptySequence));
}

#[test]
fn test_single_sample_one_frame_has_no_freedom() {
    let population = vec![split_frame(1.0, 3.0)];
    let err = t_test_single_sample(population.iter(), 0.0).unwrap_err();
    assert!(matches!(err, EchelleError::DegreesOfFreedom(0)));
}

// ---------------------------------------------------------------------------
// t_test_independent
// ---------------------------------------------------------------------------

#[test]
fn test_independent_identical_populations() {
    let a = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let b = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let result = t_test_independent(a.iter(), b.iter()).unwrap();
    assert_eq!(result.t, 0.0);
    assert!((result.p - 1.0).abs() < 1e-12);
    assert_eq!(result.df, 2);
}

#[test]
fn test_independent_hand_computed() {
    // Population A pooled variance 1.25 (see single-sample test), mean 3.
    // Population B: {10, 30} var 100 and {5, 5} var 0, pooled
    // (100*4 + 0*4) / 8 / 2 = 25, mean of means 12.5.
    // Pooled std = sqrt((1.25 + 25) / 2), t = 9.5 / pooled, df = 2.
    let a = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let b = vec![split_frame(10.0, 30.0), split_frame(5.0, 5.0)];
    let result = t_test_independent(a.iter(), b.iter()).unwrap();

    let expected_std = (13.125f64).sqrt();
    assert!((result.pooled_std - expected_std).abs() < 1e-12);
    assert!((result.t - 9.5 / expected_std).abs() < 1e-12);
    assert_eq!(result.df, 2);
    assert!((result.mean_a - 3.0).abs() < 1e-12);
    assert!((result.mean_b - 12.5).abs() < 1e-12);
}

#[test]
fn test_independent_symmetric_in_arguments() {
    let a = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let b = vec![split_frame(10.0, 30.0), split_frame(5.0, 5.0)];
    let ab = t_test_independent(a.iter(), b.iter()).unwrap();
    let ba = t_test_independent(b.iter(), a.iter()).unwrap();
    assert_eq!(ab.t, ba.t);
    assert_eq!(ab.p, ba.p);
    assert_eq!(ab.df, ba.df);
    assert_eq!(ab.pooled_std, ba.pooled_std);
    assert_eq!(ab.mean_a, ba.mean_b);
    assert_eq!(ab.mean_b, ba.mean_a);
}

#[test]
fn test_independent_unbalanced_sizes() {
    // One frame against two still leaves one degree of freedom.
    let a = vec![split_frame(1.0, 3.0)];
    let b = vec![split_frame(2.0, 6.0), split_frame(3.0, 5.0)];
    let result = t_test_independent(a.iter(), b.iter()).unwrap();
    assert_eq!(result.df, 1);
}

#[test]
fn test_independent_empty_population() {
    let a: Vec<Array2<f32>> = vec![];
    let b = vec![split_frame(1.0, 3.0)];
    let err = t_test_independent(a.iter(), b.iter()).unwrap_err();
    assert!(matches!(err, EchelleError::EmptySequence));
}

#[test]
fn test_independent_single_frame_each_has_no_freedom() {
    let a = vec![split_frame(1.0, 3.0)];
    let b = vec![split_frame(2.0, 6.0)];
    let err = t_test_independent(a.iter(), b.iter()).unwrap_err();
    assert!(matches!(err, EchelleError::DegreesOfFreedom(0)));
}

// ---------------------------------------------------------------------------
// Report formatting
// ---------------------------------------------------------------------------

#[test]
fn test_single_sample_report_format() {
    let population = vec![split_frame(0.0, 2.0), split_frame(2.0, 4.0)];
    let result = t_test_single_sample(population.iter(), 2.0).unwrap();
    let report = result.to_string();
    assert!(report.contains("t=0.000000000"), "{report}");
    assert!(report.contains("p=1.000000000"), "{report}");
    assert!(report.contains("df=1"), "{report}");
    assert!(report.contains("value=2.000000000"), "{report}");
    assert!(report.contains("mean=2.000000000"), "{report}");
    assert!(report.contains("pooledStd="), "{report}");
}

#[test]
fn test_independent_report_format() {
    let a = vec![split_frame(1.0, 3.0), split_frame(2.0, 6.0)];
    let b = vec![split_frame(10.0, 30.0), split_frame(5.0, 5.0)];
    let result = t_test_independent(a.iter(), b.iter()).unwrap();
    let report = result.to_string();
    assert!(report.contains("meanA=3.000000000"), "{report}");
    assert!(report.contains("meanB=12.500000000"), "{report}");
    assert!(report.contains("df=2"), "{report}");
}

// ---------------------------------------------------------------------------
// grand_mean / central_region
// ---------------------------------------------------------------------------

#[test]
fn test_grand_mean_equal_sizes() {
    let frames = vec![
        Array2::from_elem((4, 4), 10.0f32),
        Array2::from_elem((4, 4), 14.0f32),
    ];
    assert!((grand_mean(frames.iter()) - 12.0).abs() < 1e-12);
}

#[test]
fn test_grand_mean_weights_by_pixel_count() {
    // 4 pixels of 0 and 16 pixels of 10: (0*4 + 10*16) / 20 = 8.
    let frames = vec![
        Array2::from_elem((2, 2), 0.0f32),
        Array2::from_elem((4, 4), 10.0f32),
    ];
    assert!((grand_mean(frames.iter()) - 8.0).abs() < 1e-12);
}

#[test]
fn test_central_region_extracts_center_box() {
    let data = ramp_frame(8, 8);
    let region = central_region(&data, 4);
    assert_eq!(region.dim(), (4, 4));
    // Center of an 8x8 is (4, 4); a size-4 box spans rows/cols 2..6.
    assert_eq!(region[[0, 0]], data[[2, 2]]);
    assert_eq!(region[[3, 3]], data[[5, 5]]);
}

#[test]
fn test_central_region_clamps_to_bounds() {
    let data = ramp_frame(4, 6);
    let region = central_region(&data, 100);
    assert_eq!(region.dim(), (4, 6));
    assert_eq!(region, data);
}

#[test]
fn test_central_region_odd_size_rounds_down() {
    let data = ramp_frame(8, 8);
    let region = central_region(&data, 5);
    assert_eq!(region.dim(), (4, 4));
}
