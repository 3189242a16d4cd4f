//! Joint detection over two co-occurring series.
//!
//! A sample is above only when both series exceed their fixed thresholds.
//! There is no merge pass; runs shorter than the minimum duration are dropped.

use tracing::debug;

use airshed_core::{Event, Series};

use super::detection::{build_event, classify, extract_runs, filter_short, SampleState};

/// Combine per-series states: any finite below sample wins, then missing.
fn combine(a: SampleState, b: SampleState) -> SampleState {
    match (a, b) {
        (SampleState::Below, _) | (_, SampleState::Below) => SampleState::Below,
        (SampleState::Above, SampleState::Above) => SampleState::Above,
        _ => SampleState::Missing,
    }
}

/// Detects intervals where series A and series B are both above threshold.
#[derive(Debug, Clone, Copy)]
pub struct CombinedEventDetector {
    threshold_a: f64,
    threshold_b: f64,
    min_duration: usize,
    max_missing_gap: usize,
    placeholder_multiplier: f64,
}

impl CombinedEventDetector {
    pub fn new(threshold_a: f64, threshold_b: f64, min_duration: usize) -> Self {
        Self {
            threshold_a,
            threshold_b,
            min_duration,
            max_missing_gap: 1,
            placeholder_multiplier: 1.0,
        }
    }

    /// Longest missing-only stretch bridged inside a joint run (default 1).
    pub fn with_max_missing_gap(mut self, max_missing_gap: usize) -> Self {
        self.max_missing_gap = max_missing_gap;
        self
    }

    /// Multiplier used to back out the placeholder baseline
    /// (`threshold_a / multiplier`) stored on detected events.
    pub fn with_placeholder_multiplier(mut self, multiplier: f64) -> Self {
        self.placeholder_multiplier = multiplier;
        self
    }

    fn placeholder_baseline(&self) -> f64 {
        if self.placeholder_multiplier.abs() < f64::EPSILON {
            f64::NAN
        } else {
            self.threshold_a / self.placeholder_multiplier
        }
    }

    /// Detect joint events. Peaks, timestamps and the NaN flag come from
    /// series A. Samples beyond the shorter input are ignored.
    pub fn detect(&self, a: &Series, b: &[f64]) -> Vec<Event> {
        let states: Vec<SampleState> = a
            .values()
            .iter()
            .zip(b)
            .map(|(&x, &y)| combine(classify(x, self.threshold_a), classify(y, self.threshold_b)))
            .collect();

        let runs = filter_short(extract_runs(&states, self.max_missing_gap), self.min_duration);
        let placeholder = self.placeholder_baseline();

        let events: Vec<Event> = runs
            .into_iter()
            .filter_map(|run| build_event(a, run, placeholder))
            .collect();

        debug!(
            threshold_a = self.threshold_a,
            threshold_b = self.threshold_b,
            events = events.len(),
            "combined detection complete"
        );
        events
    }
}

/// Overwrite the baseline slots of every event, as the caller does after
/// combined detection with a percentile of series A.
pub fn rebase_events(events: &mut [Event], baseline: f64) {
    for event in events {
        event.rebase(baseline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    #[test]
    fn requires_both_series_above() {
        let a = Series::from_values(vec![1.0, 9.0, 9.0, 9.0, 9.0, 1.0]);
        let b = [1.0, 1.0, 20.0, 20.0, 20.0, 20.0];
        let events = CombinedEventDetector::new(5.0, 10.0, 2).detect(&a, &b);
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].start, events[0].end), (2, 4));
    }

    #[test]
    fn short_joint_runs_are_dropped_and_not_merged() {
        let a = Series::from_values(vec![9.0, 9.0, 1.0, 9.0, 9.0, 9.0]);
        let b = [20.0; 6];
        let events = CombinedEventDetector::new(5.0, 10.0, 3).detect(&a, &b);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, 3);
        assert!(!events[0].quality.merged);
    }

    #[test]
    fn placeholder_baseline_is_threshold_over_multiplier() {
        let a = Series::from_values(vec![9.0, 9.0, 9.0]);
        let b = [20.0; 3];
        let events = CombinedEventDetector::new(6.0, 10.0, 1)
            .with_placeholder_multiplier(3.0)
            .detect(&a, &b);
        assert_eq!(events[0].baseline, 2.0);
        assert_eq!(events[0].baseline_out, 2.0);
    }

    #[test]
    fn rebase_overrides_placeholder() {
        let a = Series::from_values(vec![1.0, 9.0, 9.0, 1.0]);
        let b = [20.0; 4];
        let mut events = CombinedEventDetector::new(5.0, 10.0, 1).detect(&a, &b);
        rebase_events(&mut events, 1.5);
        assert_eq!(events[0].baseline, 1.5);
        assert_eq!(events[0].baseline_out, 1.5);
    }

    #[test]
    fn nan_in_either_series_bridges_but_below_splits() {
        let a = Series::from_values(vec![9.0, NAN, 9.0, 9.0, 9.0]);
        let b = [20.0, 20.0, NAN, 1.0, 20.0];
        let events = CombinedEventDetector::new(5.0, 10.0, 1).detect(&a, &b);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].start, events[0].end), (0, 0));
        assert_eq!((events[1].start, events[1].end), (4, 4));

        let b = [20.0, 20.0, NAN, 20.0, 20.0];
        let events = CombinedEventDetector::new(5.0, 10.0, 1)
            .with_max_missing_gap(2)
            .detect(&a, &b);
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].start, events[0].end), (0, 4));
        assert!(events[0].quality.nan_gap);
    }

    #[test]
    fn missing_stretch_longer_than_limit_splits_joint_runs() {
        let mut a = vec![9.0, 9.0];
        a.extend(vec![NAN; 50]);
        a.extend([9.0, 9.0]);
        let b = vec![20.0; a.len()];
        let events = CombinedEventDetector::new(5.0, 10.0, 2).detect(&Series::from_values(a), &b);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].start, events[0].end), (0, 1));
        assert_eq!((events[1].start, events[1].end), (52, 53));
    }
}
