//! First departure of the indoor signal after an outdoor event starts.

use airshed_core::Event;
use airshed_params::FirstResponseSettings;

use super::baseline::{local_baseline, variability};

/// Departure threshold: `base + max(abs_threshold, multiplier × variability)`.
///
/// An undefined variability falls back to the absolute floor alone.
pub fn departure_threshold(base: f64, varb: Option<f64>, settings: &FirstResponseSettings) -> f64 {
    let floor = settings.abs_threshold;
    let margin = match varb {
        Some(v) if v.is_finite() => floor.max(settings.departure_multiplier * v),
        _ => floor,
    };
    base + margin
}

/// Offset (1-based, the event start itself is 1) of the first indoor sample
/// strictly above the departure threshold, searching at most `lookahead`
/// samples past `event.start`.
///
/// `None` when the event starts at the first sample, the pre-event window
/// has no finite samples, or nothing departs within range.
pub fn first_response(
    event: &Event,
    indoor: &[f64],
    settings: &FirstResponseSettings,
) -> Option<usize> {
    let start = event.start;
    if start == 0 || start >= indoor.len() {
        return None;
    }

    let base = local_baseline(
        indoor,
        start,
        settings.baseline_window,
        settings.baseline_statistic,
    )?;
    let varb = variability(
        indoor,
        start,
        settings.baseline_window,
        settings.variability_method,
    );
    let threshold = departure_threshold(base, varb, settings);

    let stop = indoor.len().min(start + settings.lookahead + 1);
    indoor[start..stop]
        .iter()
        .position(|&x| x.is_finite() && x > threshold)
        .map(|k| k + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airshed_core::{EventQuality, Timestamp};
    use airshed_params::{BaselineStatistic, VariabilityMethod};

    fn event(start: usize, end: usize) -> Event {
        Event {
            start,
            end,
            duration: end - start + 1,
            peak_time: start,
            peak_value: 0.0,
            baseline: 0.0,
            baseline_out: 0.0,
            start_time: Timestamp::Index(start as f64 + 1.0),
            end_time: Timestamp::Index(end as f64 + 1.0),
            peak_timestamp: Timestamp::Index(start as f64 + 1.0),
            quality: EventQuality::default(),
        }
    }

    fn settings() -> FirstResponseSettings {
        FirstResponseSettings {
            baseline_window: 3,
            baseline_statistic: BaselineStatistic::Mean,
            variability_method: VariabilityMethod::Stdev,
            abs_threshold: 2.0,
            departure_multiplier: 3.0,
            lookahead: 5,
        }
    }

    #[test]
    fn absolute_floor_applies_to_flat_baseline() {
        // base 5, stdev 0 -> threshold 7
        let indoor = [5.0, 5.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert_eq!(first_response(&event(3, 4), &indoor, &settings()), Some(3));
    }

    #[test]
    fn noisy_baseline_raises_threshold() {
        // window [2, 6, 4]: mean 4, stdev 2 -> threshold 4 + 6 = 10
        let indoor = [2.0, 6.0, 4.0, 9.0, 10.0, 11.0];
        assert_eq!(first_response(&event(3, 3), &indoor, &settings()), Some(3));
    }

    #[test]
    fn undefined_at_first_sample() {
        let indoor = [100.0, 100.0];
        assert_eq!(first_response(&event(0, 1), &indoor, &settings()), None);
    }

    #[test]
    fn undefined_when_window_is_all_missing() {
        let indoor = [f64::NAN, f64::NAN, 50.0];
        assert_eq!(first_response(&event(2, 2), &indoor, &settings()), None);
    }

    #[test]
    fn search_stops_after_lookahead() {
        let mut s = settings();
        s.lookahead = 1;
        let indoor = [5.0, 5.0, 5.0, 5.0, 5.0, 50.0];
        assert_eq!(first_response(&event(3, 3), &indoor, &s), None);
        s.lookahead = 2;
        assert_eq!(first_response(&event(3, 3), &indoor, &s), Some(3));
    }
}
