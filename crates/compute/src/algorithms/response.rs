//! Indoor response metrics for outdoor events.
//!
//! Every metric is optional: an empty window, a near-zero denominator or a
//! short trailing segment leaves the slot `None` instead of zero.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use airshed_core::Event;
use airshed_params::ResponseSettings;

use super::baseline::mean;
use super::detection::peak_in;

/// Per-event metric names, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LagTime,
    PeakReduction,
    IntegratedReduction,
    RecoveryTime,
    ResponseTime,
    ReturnToBaselineTime,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::LagTime,
        Metric::PeakReduction,
        Metric::IntegratedReduction,
        Metric::RecoveryTime,
        Metric::ResponseTime,
        Metric::ReturnToBaselineTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::LagTime => "lag_time",
            Metric::PeakReduction => "peak_reduction",
            Metric::IntegratedReduction => "integrated_reduction",
            Metric::RecoveryTime => "recovery_time",
            Metric::ResponseTime => "response_time",
            Metric::ReturnToBaselineTime => "return_to_baseline_time",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics for one event under one indoor series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseMetrics {
    /// Indoor peak index minus outdoor peak index; positive means indoor lags.
    pub lag_time: Option<i64>,
    /// Percent reduction of the indoor peak against a unit-transfer expectation.
    pub peak_reduction: Option<f64>,
    /// Percent reduction of summed indoor excess against summed outdoor excess.
    pub integrated_reduction: Option<f64>,
    pub recovery_time: Option<usize>,
    pub response_time: Option<usize>,
    pub return_to_baseline_time: Option<usize>,
    /// Mean indoor level over the pre-event window.
    pub indoor_baseline: Option<f64>,
    pub indoor_peak: Option<f64>,
}

impl ResponseMetrics {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::LagTime => self.lag_time.map(|v| v as f64),
            Metric::PeakReduction => self.peak_reduction,
            Metric::IntegratedReduction => self.integrated_reduction,
            Metric::RecoveryTime => self.recovery_time.map(|v| v as f64),
            Metric::ResponseTime => self.response_time.map(|v| v as f64),
            Metric::ReturnToBaselineTime => self.return_to_baseline_time.map(|v| v as f64),
        }
    }
}

/// Mean of the defined values; `None` when nothing is defined.
pub fn mean_defined<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Per-metric means over a set of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricMeans(BTreeMap<Metric, Option<f64>>);

impl MetricMeans {
    pub fn from_metrics(per_event: &[ResponseMetrics]) -> Self {
        Self(
            Metric::ALL
                .iter()
                .map(|&m| (m, mean_defined(per_event.iter().map(|r| r.value(m)))))
                .collect(),
        )
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied().flatten()
    }
}

/// Per-event metrics plus their aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseReport {
    pub per_event: Vec<ResponseMetrics>,
    pub means: MetricMeans,
}

impl ResponseReport {
    pub fn new(per_event: Vec<ResponseMetrics>) -> Self {
        let means = MetricMeans::from_metrics(&per_event);
        Self { per_event, means }
    }

    /// Recompute aggregates after per-event slots were filled in.
    pub fn refresh_means(&mut self) {
        self.means = MetricMeans::from_metrics(&self.per_event);
    }

    /// One metric across all events, in event order.
    pub fn vector(&self, metric: Metric) -> Vec<Option<f64>> {
        self.per_event.iter().map(|r| r.value(metric)).collect()
    }
}

fn non_zero(x: f64) -> Option<f64> {
    (x.is_finite() && x.abs() >= f64::EPSILON).then_some(x)
}

/// Computes lag, peak reduction, integrated reduction and recovery time.
#[derive(Debug, Clone, Copy)]
pub struct ResponseMetricsCalculator {
    settings: ResponseSettings,
}

impl ResponseMetricsCalculator {
    pub fn new(settings: ResponseSettings) -> Self {
        Self { settings }
    }

    /// Metrics for a single event. `response_time` and
    /// `return_to_baseline_time` are left unset.
    pub fn event_response(&self, event: &Event, outdoor: &[f64], indoor: &[f64]) -> ResponseMetrics {
        let n = indoor.len().min(outdoor.len());
        if n == 0 || event.start >= n {
            return ResponseMetrics::default();
        }

        let pre = event.start.saturating_sub(self.settings.pre_event)..event.start;
        let base = mean(&indoor[pre]);

        let win_end = (n - 1).min(event.end + self.settings.post_event);
        let indoor_peak = peak_in(indoor, event.start, win_end);
        let lag_time = indoor_peak.map(|(idx, _)| idx as i64 - event.peak_time as i64);

        let peak_reduction = base.zip(indoor_peak).and_then(|(b, (_, peak))| {
            let expected = non_zero(b + (event.peak_value - event.baseline))?;
            Some(100.0 * (expected - peak) / expected)
        });

        let integrated_reduction = base.and_then(|b| {
            let (sum_in, sum_out) = (event.start..=win_end)
                .filter(|&i| indoor[i].is_finite() && outdoor[i].is_finite())
                .fold((0.0, 0.0), |(si, so), i| {
                    (si + (indoor[i] - b), so + (outdoor[i] - event.baseline))
                });
            let sum_out = non_zero(sum_out)?;
            Some(100.0 * (1.0 - sum_in / sum_out))
        });

        ResponseMetrics {
            lag_time,
            peak_reduction,
            integrated_reduction,
            recovery_time: base.and_then(|b| self.recovery_time(event, indoor, b)),
            response_time: None,
            return_to_baseline_time: None,
            indoor_baseline: base,
            indoor_peak: indoor_peak.map(|(_, v)| v),
        }
    }

    /// Offset (1-based from `event.end`) of the first indoor sample below
    /// `base × recovery_factor`. Requires a full lookahead window.
    fn recovery_time(&self, event: &Event, indoor: &[f64], base: f64) -> Option<usize> {
        let stop = event.end + self.settings.lookahead;
        if stop > indoor.len() {
            return None;
        }
        let threshold = base * self.settings.recovery_factor;
        indoor[event.end..stop]
            .iter()
            .position(|&x| x.is_finite() && x < threshold)
            .map(|k| k + 1)
    }

    /// Metrics for every event, computed in parallel, plus aggregates.
    pub fn compute(&self, events: &[Event], outdoor: &[f64], indoor: &[f64]) -> ResponseReport {
        let per_event: Vec<ResponseMetrics> = events
            .par_iter()
            .map(|e| self.event_response(e, outdoor, indoor))
            .collect();
        debug!(events = events.len(), "response metrics computed");
        ResponseReport::new(per_event)
    }
}
