//! Return-to-baseline time: how long after an event the indoor signal
//! settles back into a tolerance band around its pre-event level.

use airshed_core::Event;
use airshed_params::ReturnToBaselineSettings;

/// Tolerance band `[b(1 − tol), b(1 + tol)]`, ordered for negative baselines.
pub fn tolerance_band(baseline: f64, tolerance: f64) -> (f64, f64) {
    let a = baseline * (1.0 - tolerance);
    let b = baseline * (1.0 + tolerance);
    (a.min(b), a.max(b))
}

/// Offset (1-based, `event.end` itself is 1) of the first window of `hold`
/// samples lying entirely inside the band around `baseline_at(event.start)`.
///
/// `None` when too few samples trail the event, the baseline is undefined,
/// or no window qualifies within the lookahead.
pub fn time_to_return<F>(
    event: &Event,
    indoor: &[f64],
    baseline_at: F,
    settings: &ReturnToBaselineSettings,
) -> Option<usize>
where
    F: Fn(usize) -> Option<f64>,
{
    let n = indoor.len();
    if settings.hold == 0 || event.end >= n {
        return None;
    }
    let trailing = n - 1 - event.end;
    if trailing < settings.min_trailing {
        return None;
    }

    let baseline = baseline_at(event.start).filter(|b| b.is_finite())?;
    let (lo, hi) = tolerance_band(baseline, settings.tolerance_fraction);
    let in_band = |x: f64| x.is_finite() && x >= lo && x <= hi;

    let limit = (n - 1).min(event.end + settings.lookahead);
    let last_start = (limit + 1).checked_sub(settings.hold)?;

    (event.end..=last_start)
        .find(|&pos| indoor[pos..pos + settings.hold].iter().all(|&x| in_band(x)))
        .map(|pos| pos - event.end + 1)
}
