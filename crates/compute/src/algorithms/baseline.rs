//! Robust baseline and dispersion estimates.
//!
//! Every statistic skips non-finite samples instead of zero-filling them,
//! and returns `None` when nothing finite remains.

use std::ops::Range;

use airshed_params::{BaselineStatistic, VariabilityMethod};

/// Scale that makes the median absolute deviation comparable to a standard
/// deviation for normally distributed data.
pub const MAD_SCALE: f64 = 1.4826;

fn finite_sorted(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Linear-interpolated percentile of the finite samples.
///
/// Rank is `p / 100 × (n − 1)` over the sorted finite samples; `p` is
/// clamped to `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let sorted = finite_sorted(values);
    if sorted.is_empty() || p.is_nan() {
        return None;
    }

    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Whole-series baseline: the given percentile of all finite samples.
pub fn baseline(series: &[f64], p: f64) -> Option<f64> {
    percentile(series, p)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, c), &x| (s + x, c + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Sample standard deviation (n − 1 denominator); 0 for a single sample.
pub fn stdev(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    let m = mean(&finite)?;
    if finite.len() < 2 {
        return Some(0.0);
    }
    let ss: f64 = finite.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (finite.len() - 1) as f64).sqrt())
}

/// Scaled median absolute deviation.
pub fn mad(values: &[f64]) -> Option<f64> {
    let med = median(values)?;
    let deviations: Vec<f64> = values
        .iter()
        .filter(|x| x.is_finite())
        .map(|x| (x - med).abs())
        .collect();
    median(&deviations).map(|d| d * MAD_SCALE)
}

/// Trailing window of at most `window` samples ending one sample before
/// `reference`. Empty when `reference` is 0.
pub fn trailing_window(reference: usize, window: usize) -> Range<usize> {
    reference.saturating_sub(window)..reference
}

fn window_slice(series: &[f64], reference: usize, window: usize) -> &[f64] {
    let range = trailing_window(reference.min(series.len()), window);
    &series[range]
}

/// Local baseline over the trailing window before `reference`.
///
/// `None` when the window is empty or holds no finite sample; callers skip.
pub fn local_baseline(
    series: &[f64],
    reference: usize,
    window: usize,
    statistic: BaselineStatistic,
) -> Option<f64> {
    let slice = window_slice(series, reference, window);
    match statistic {
        BaselineStatistic::Mean => mean(slice),
        BaselineStatistic::Median => median(slice),
    }
}

/// Dispersion over the same trailing window as [`local_baseline`].
pub fn variability(
    series: &[f64],
    reference: usize,
    window: usize,
    method: VariabilityMethod,
) -> Option<f64> {
    let slice = window_slice(series, reference, window);
    match method {
        VariabilityMethod::Stdev => stdev(slice),
        VariabilityMethod::Mad => mad(slice),
    }
}
