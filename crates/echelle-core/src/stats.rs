use std::fmt;

use ndarray::{s, Array2};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::consts::REPORT_PRECISION;
use crate::error::{EchelleError, Result};

/// Result of testing a frame population's mean against a known value.
#[derive(Clone, Copy, Debug)]
pub struct SingleSampleTTest {
    pub t: f64,
    pub p: f64,
    pub df: usize,
    /// The reference value the population mean was tested against.
    pub reference: f64,
    /// Mean of the per-frame means.
    pub mean: f64,
    pub pooled_std: f64,
}

impl fmt::Display for SingleSampleTTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.prec$} p={:.prec$} df={} value={:.prec$} mean={:.prec$} pooledStd={:.prec$}",
            self.t,
            self.p,
            self.df,
            self.reference,
            self.mean,
            self.pooled_std,
            prec = REPORT_PRECISION
        )
    }
}

/// Result of testing two independent frame populations against each other.
#[derive(Clone, Copy, Debug)]
pub struct IndependentTTest {
    pub t: f64,
    pub p: f64,
    pub df: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    pub pooled_std: f64,
}

impl fmt::Display for IndependentTTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.prec$} p={:.prec$} df={} meanA={:.prec$} meanB={:.prec$} pooledStd={:.prec$}",
            self.t,
            self.p,
            self.df,
            self.mean_a,
            self.mean_b,
            self.pooled_std,
            prec = REPORT_PRECISION
        )
    }
}

/// One-sample t-test of per-frame means against `reference`.
///
/// The statistic is the absolute difference between the mean of the
/// per-frame means and the reference, over the size-weighted pooled
/// standard deviation of the per-frame population variances, with
/// `n - 1` degrees of freedom. This is the estimator the commissioning
/// reports were produced with; it is deliberately not the textbook
/// one-sample formulation.
pub fn t_test_single_sample<'a, I>(population: I, reference: f64) -> Result<SingleSampleTTest>
where
    I: IntoIterator<Item = &'a Array2<f32>>,
{
    let population: Vec<&Array2<f32>> = population.into_iter().collect();
    if population.is_empty() {
        return Err(EchelleError::EmptySequence);
    }
    let df = population.len() - 1;
    if df < 1 {
        return Err(EchelleError::DegreesOfFreedom(df));
    }

    let mean = population_mean(&population);
    let pooled_std = pooled_variance(&population).sqrt();
    let t = t_statistic((mean - reference).abs(), pooled_std);
    let p = two_tailed_p(t, df)?;

    Ok(SingleSampleTTest {
        t,
        p,
        df,
        reference,
        mean,
        pooled_std,
    })
}

/// Independent two-sample t-test between frame populations `a` and `b`.
///
/// Pools the two populations' size-weighted variances with equal weight
/// and uses `(n_a - 1) + (n_b - 1)` degrees of freedom.
pub fn t_test_independent<'a, 'b, A, B>(a: A, b: B) -> Result<IndependentTTest>
where
    A: IntoIterator<Item = &'a Array2<f32>>,
    B: IntoIterator<Item = &'b Array2<f32>>,
{
    let a: Vec<&Array2<f32>> = a.into_iter().collect();
    let b: Vec<&Array2<f32>> = b.into_iter().collect();
    if a.is_empty() || b.is_empty() {
        return Err(EchelleError::EmptySequence);
    }
    let df = (a.len() - 1) + (b.len() - 1);
    if df < 1 {
        return Err(EchelleError::DegreesOfFreedom(df));
    }

    let mean_a = population_mean(&a);
    let mean_b = population_mean(&b);
    let pooled_std = ((pooled_variance(&a) + pooled_variance(&b)) / 2.0).sqrt();
    let t = t_statistic((mean_a - mean_b).abs(), pooled_std);
    let p = two_tailed_p(t, df)?;

    Ok(IndependentTTest {
        t,
        p,
        df,
        mean_a,
        mean_b,
        pooled_std,
    })
}

/// Mean over every pixel of every frame.
pub fn grand_mean<'a, I>(frames: I) -> f64
where
    I: IntoIterator<Item = &'a Array2<f32>>,
{
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for frame in frames {
        sum += frame.iter().map(|&v| v as f64).sum::<f64>();
        count += frame.len();
    }
    sum / count as f64
}

/// Centered square crop, for comparing the same detector sub-region
/// across populations.
///
/// The box spans `size / 2` pixels either side of the array center and
/// is clamped to the array bounds, so the result can be smaller than
/// `size` on tiny inputs (and one short on odd sizes).
pub fn central_region(data: &Array2<f32>, size: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let half = size / 2;
    let (rc, cc) = (h / 2, w / 2);
    let r0 = rc.saturating_sub(half);
    let r1 = (rc + half).min(h);
    let c0 = cc.saturating_sub(half);
    let c1 = (cc + half).min(w);
    data.slice(s![r0..r1, c0..c1]).to_owned()
}

/// Zero mean difference is a zero statistic even when the pooled
/// deviation also vanishes.
fn t_statistic(abs_diff: f64, pooled_std: f64) -> f64 {
    if abs_diff == 0.0 {
        0.0
    } else {
        abs_diff / pooled_std
    }
}

/// Mean of the per-frame means.
fn population_mean(population: &[&Array2<f32>]) -> f64 {
    let sum: f64 = population.iter().map(|f| frame_mean(f)).sum();
    sum / population.len() as f64
}

/// Size-weighted pooled variance: per-frame population variances are
/// weighted by pixel count, then scaled by a further `1 / n` frames.
fn pooled_variance(population: &[&Array2<f32>]) -> f64 {
    let weighted: f64 = population
        .iter()
        .map(|f| frame_variance(f) * f.len() as f64)
        .sum();
    let total: f64 = population.iter().map(|f| f.len() as f64).sum();
    weighted / total / population.len() as f64
}

fn frame_mean(frame: &Array2<f32>) -> f64 {
    let sum: f64 = frame.iter().map(|&v| v as f64).sum();
    sum / frame.len() as f64
}

/// Population variance (no Bessel correction).
fn frame_variance(frame: &Array2<f32>) -> f64 {
    let mean = frame_mean(frame);
    let sum: f64 = frame
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    sum / frame.len() as f64
}

/// Two-tailed p-value `1 - (F(t) - F(-t))` from the Student-t CDF.
fn two_tailed_p(t: f64, df: usize) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|_| EchelleError::DegreesOfFreedom(df))?;
    Ok(1.0 - (dist.cdf(t) - dist.cdf(-t)))
}
