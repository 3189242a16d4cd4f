//! Threshold-based event detection.
//!
//! A series is segmented into maximal above-threshold runs, near-adjacent
//! runs are merged, and short runs are dropped. Detection is a single
//! ordered scan and is never parallelized internally.

use serde::Serialize;
use tracing::debug;

use airshed_core::{Event, EventQuality, Series};
use airshed_params::DetectionSettings;

use super::baseline;

/// Classification of one sample against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Above,
    Below,
    /// Non-finite reading: never above, but does not end a run.
    Missing,
}

/// Classify one sample. A finite sample is above when strictly greater
/// than the threshold.
pub fn classify(value: f64, threshold: f64) -> SampleState {
    if !value.is_finite() {
        SampleState::Missing
    } else if value > threshold {
        SampleState::Above
    } else {
        SampleState::Below
    }
}

/// An inclusive index run of above-threshold samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub end: usize,
    pub merged: bool,
}

impl Run {
    pub fn duration(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Extract maximal above-runs.
///
/// Runs always start and end on an above sample. A stretch of at most
/// `max_missing_gap` missing samples between two above samples is bridged;
/// a longer stretch closes the run. Missing samples before a below sample
/// are not included.
pub fn extract_runs(states: &[SampleState], max_missing_gap: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;
    let mut missing = 0usize;

    for (i, state) in states.iter().enumerate() {
        match state {
            SampleState::Above => {
                missing = 0;
                match current.as_mut() {
                    Some(run) => run.end = i,
                    None => {
                        current = Some(Run {
                            start: i,
                            end: i,
                            merged: false,
                        })
                    }
                }
            }
            SampleState::Missing => {
                if current.is_some() {
                    missing += 1;
                    if missing > max_missing_gap {
                        runs.extend(current.take());
                    }
                }
            }
            SampleState::Below => {
                missing = 0;
                runs.extend(current.take());
            }
        }
    }

    runs.extend(current);
    runs
}

/// Merge runs whose gap (samples strictly between them) is at most
/// `min_separation`. Touching or overlapping runs count as a zero gap.
pub fn merge_runs(runs: Vec<Run>, min_separation: usize) -> Vec<Run> {
    let mut iter = runs.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        let gap = next.start.saturating_sub(current.end + 1);
        if gap <= min_separation {
            current.end = next.end;
            current.merged = true;
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Drop runs shorter than `min_duration` samples.
pub fn filter_short(runs: Vec<Run>, min_duration: usize) -> Vec<Run> {
    runs.into_iter().filter(|r| r.duration() >= min_duration).collect()
}

/// First-occurrence maximum over finite samples in `[start, end]`.
pub fn peak_in(values: &[f64], start: usize, end: usize) -> Option<(usize, f64)> {
    let end = end.min(values.len().checked_sub(1)?);
    if start > end {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values[start..=end].iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((start + i, v)),
        }
    }
    best
}

/// Build an event from a run over `series`, tagging it with `baseline`.
pub fn build_event(series: &Series, run: Run, baseline: f64) -> Option<Event> {
    let values = series.values();
    let (peak_time, peak_value) = peak_in(values, run.start, run.end)?;
    let nan_gap = values[run.start..=run.end].iter().any(|v| !v.is_finite());

    Some(Event {
        start: run.start,
        end: run.end,
        duration: run.duration(),
        peak_time,
        peak_value,
        baseline,
        baseline_out: baseline,
        start_time: series.timestamp(run.start)?,
        end_time: series.timestamp(run.end)?,
        peak_timestamp: series.timestamp(peak_time)?,
        quality: EventQuality {
            merged: run.merged,
            short: false,
            nan_gap,
        },
    })
}

/// Result of one detection pass.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    /// Whole-series percentile baseline; `None` for an all-missing series.
    pub baseline: Option<f64>,
    pub threshold: Option<f64>,
    pub events: Vec<Event>,
}

impl DetectionOutcome {
    fn empty() -> Self {
        Self {
            baseline: None,
            threshold: None,
            events: Vec::new(),
        }
    }
}

/// Detects events where a single series exceeds `baseline × multiplier`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEventDetector {
    settings: DetectionSettings,
}

impl ThresholdEventDetector {
    pub fn new(settings: DetectionSettings) -> Self {
        Self { settings }
    }

    pub fn detect(&self, series: &Series) -> DetectionOutcome {
        let Some(baseline) = baseline::baseline(series.values(), self.settings.baseline_percentile)
        else {
            debug!(samples = series.len(), "no finite samples; nothing to detect");
            return DetectionOutcome::empty();
        };
        let threshold = baseline * self.settings.threshold_multiplier;

        let states: Vec<SampleState> = series
            .values()
            .iter()
            .map(|&v| classify(v, threshold))
            .collect();

        let runs = extract_runs(&states, self.settings.max_missing_gap());
        let candidate_count = runs.len();
        let runs = merge_runs(runs, self.settings.min_separation);
        let merged_count = runs.len();
        let runs = filter_short(runs, self.settings.min_duration);

        let events: Vec<Event> = runs
            .into_iter()
            .filter_map(|run| build_event(series, run, baseline))
            .collect();

        debug!(
            baseline,
            threshold,
            candidates = candidate_count,
            after_merge = merged_count,
            events = events.len(),
            "threshold detection complete"
        );

        DetectionOutcome {
            baseline: Some(baseline),
            threshold: Some(threshold),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airshed_core::Timestamp;

    const NAN: f64 = f64::NAN;

    fn settings(multiplier: f64, min_duration: usize, min_separation: usize) -> DetectionSettings {
        DetectionSettings {
            baseline_percentile: 20.0,
            threshold_multiplier: multiplier,
            min_duration,
            min_separation,
        }
    }

    fn detect(values: Vec<f64>, s: DetectionSettings) -> DetectionOutcome {
        ThresholdEventDetector::new(s).detect(&Series::from_values(values))
    }

    fn states(values: &[f64], threshold: f64) -> Vec<SampleState> {
        values.iter().map(|&v| classify(v, threshold)).collect()
    }

    #[test]
    fn basic_detection_scenario() {
        let out = detect(vec![1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 1.0, 1.0], settings(5.0, 2, 0));
        assert_eq!(out.baseline, Some(1.0));
        assert_eq!(out.threshold, Some(5.0));
        assert_eq!(out.events.len(), 1);

        let e = &out.events[0];
        assert_eq!((e.start, e.end, e.duration), (3, 5, 3));
        assert_eq!(e.peak_time, 3);
        assert_eq!(e.peak_value, 9.0);
        assert_eq!(e.baseline, 1.0);
        assert_eq!(e.baseline_out, 1.0);
        assert_eq!(e.start_time, Timestamp::Index(4.0));
        assert_eq!(e.end_time, Timestamp::Index(6.0));
        assert_eq!(e.peak_timestamp, Timestamp::Index(4.0));
        assert_eq!(e.quality, EventQuality::default());
    }

    #[test]
    fn merge_scenario() {
        // Above at 0-based [3,4] and [6,7], one below sample between.
        let values = vec![1.0, 1.0, 1.0, 9.0, 9.0, 1.0, 9.0, 9.0, 1.0, 1.0];
        let out = detect(values, settings(5.0, 2, 1));
        assert_eq!(out.events.len(), 1);
        let e = &out.events[0];
        assert_eq!((e.start, e.end, e.duration), (3, 7, 5));
        assert!(e.quality.merged);
    }

    #[test]
    fn runs_gap_one_more_than_separation_stay_apart() {
        let values = vec![1.0, 1.0, 1.0, 9.0, 9.0, 1.0, 1.0, 9.0, 9.0, 1.0, 1.0];
        let out = detect(values, settings(5.0, 2, 1));
        assert_eq!(out.events.len(), 2);
        assert!(!out.events[0].quality.merged);
        assert_eq!((out.events[1].start, out.events[1].end), (7, 8));
    }

    #[test]
    fn duration_filter_boundary() {
        let values = vec![1.0, 1.0, 1.0, 9.0, 9.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 1.0];
        let out = detect(values, settings(5.0, 3, 0));
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].start, 8);
        assert_eq!(out.events[0].duration, 3);
    }

    #[test]
    fn plateau_peak_takes_lowest_index() {
        let values = vec![1.0, 1.0, 1.0, 6.0, 9.0, 9.0, 9.0, 7.0, 1.0, 1.0];
        let out = detect(values, settings(5.0, 1, 0));
        assert_eq!(out.events[0].peak_time, 4);
    }

    #[test]
    fn nan_inside_event_sets_flag_without_splitting() {
        let clean = detect(
            vec![1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0, 1.0, 1.0, 1.0],
            settings(5.0, 2, 0),
        );
        let gappy = detect(
            vec![1.0, 1.0, 1.0, 9.0, NAN, 9.0, 9.0, 1.0, 1.0, 1.0],
            settings(5.0, 2, 0),
        );
        assert_eq!(gappy.events.len(), 1);
        let (c, g) = (&clean.events[0], &gappy.events[0]);
        assert_eq!((g.start, g.end, g.duration), (c.start, c.end, c.duration));
        assert!(g.quality.nan_gap);
        assert!(!g.quality.merged);
        assert!(!c.quality.nan_gap);
    }

    #[test]
    fn trailing_nan_is_not_part_of_event() {
        let out = detect(
            vec![1.0, 1.0, 1.0, 9.0, 9.0, NAN, 1.0, 1.0, 1.0, 1.0],
            settings(5.0, 2, 0),
        );
        assert_eq!(out.events[0].end, 4);
        assert!(!out.events[0].quality.nan_gap);
    }

    #[test]
    fn all_nan_and_all_below_yield_no_events() {
        let out = detect(vec![NAN; 6], settings(2.0, 1, 0));
        assert!(out.events.is_empty());
        assert_eq!(out.baseline, None);

        let out = detect(vec![3.0; 6], settings(2.0, 1, 0));
        assert!(out.events.is_empty());
        assert_eq!(out.threshold, Some(6.0));
    }

    #[test]
    fn zero_baseline_treats_any_positive_sample_as_above() {
        let out = detect(vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.2, 0.0], settings(3.0, 1, 0));
        assert_eq!(out.threshold, Some(0.0));
        assert_eq!(out.events.len(), 1);
        assert_eq!((out.events[0].start, out.events[0].end), (4, 5));
    }

    #[test]
    fn extract_runs_bridges_missing_only_between_above() {
        let s = states(&[9.0, NAN, NAN, 9.0, 1.0, NAN, 9.0], 5.0);
        let runs = extract_runs(&s, 2);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].start, runs[0].end), (0, 3));
        assert_eq!((runs[1].start, runs[1].end), (6, 6));
    }

    #[test]
    fn extract_runs_closes_on_missing_stretch_longer_than_limit() {
        let s = states(&[9.0, NAN, NAN, 9.0, 9.0, NAN, 9.0], 5.0);
        let runs = extract_runs(&s, 1);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].start, runs[0].end), (0, 0));
        assert_eq!((runs[1].start, runs[1].end), (3, 6));
    }

    #[test]
    fn long_outage_splits_episodes() {
        let mut values = vec![1.0; 10];
        values.extend([9.0, 9.0]);
        values.extend(vec![NAN; 200]);
        values.extend([9.0, 9.0]);
        values.extend(vec![1.0; 10]);

        let out = detect(values, settings(5.0, 2, 1));
        assert_eq!(out.events.len(), 2);
        assert_eq!((out.events[0].start, out.events[0].end), (10, 11));
        assert_eq!((out.events[1].start, out.events[1].end), (212, 213));
        assert!(out.events.iter().all(|e| !e.quality.merged && !e.quality.nan_gap));
    }

    #[test]
    fn outage_within_separation_is_bridged() {
        let values = vec![1.0, 1.0, 1.0, 9.0, NAN, NAN, NAN, 9.0, 1.0, 1.0];
        let out = detect(values, settings(5.0, 2, 3));
        assert_eq!(out.events.len(), 1);
        assert_eq!((out.events[0].start, out.events[0].end), (3, 7));
        assert!(out.events[0].quality.nan_gap);
    }

    #[test]
    fn merge_chains_multiple_runs() {
        let runs = vec![
            Run { start: 0, end: 1, merged: false },
            Run { start: 3, end: 3, merged: false },
            Run { start: 5, end: 6, merged: false },
            Run { start: 10, end: 11, merged: false },
        ];
        let merged = merge_runs(runs, 1);
        assert_eq!(merged.len(), 2);
        assert_eq!((merged[0].start, merged[0].end, merged[0].merged), (0, 6, true));
        assert_eq!((merged[1].start, merged[1].end, merged[1].merged), (10, 11, false));
    }

    #[test]
    fn merge_treats_touching_runs_as_zero_gap() {
        let runs = vec![
            Run { start: 0, end: 2, merged: false },
            Run { start: 3, end: 4, merged: false },
            Run { start: 4, end: 5, merged: false },
        ];
        let merged = merge_runs(runs, 0);
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].start, merged[0].end, merged[0].merged), (0, 5, true));
    }

    #[test]
    fn peak_in_skips_nan() {
        assert_eq!(peak_in(&[NAN, 2.0, 5.0, 5.0], 0, 3), Some((2, 5.0)));
        assert_eq!(peak_in(&[NAN, NAN], 0, 1), None);
        assert_eq!(peak_in(&[], 0, 0), None);
    }
}
