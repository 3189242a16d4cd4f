//! Per-configuration result records.

use std::collections::BTreeMap;

use serde::Serialize;

use airshed_core::{AnalysisScope, ConfigurationKey, Event, Leakage, Pollutant};

use crate::algorithms::envelope::{Envelope, EnvelopeNotice};
use crate::algorithms::response::{mean_defined, Metric, MetricMeans, ResponseMetrics, ResponseReport};

/// Descriptive statistics over one detected event set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStats {
    pub count: usize,
    pub mean_duration: Option<f64>,
    pub mean_peak_value: Option<f64>,
    pub merged: usize,
    pub nan_gap: usize,
}

impl EventStats {
    pub fn from_events(events: &[Event]) -> Self {
        Self {
            count: events.len(),
            mean_duration: mean_defined(events.iter().map(|e| Some(e.duration as f64))),
            mean_peak_value: mean_defined(events.iter().map(|e| Some(e.peak_value))),
            merged: events.iter().filter(|e| e.quality.merged).count(),
            nan_gap: events.iter().filter(|e| e.quality.nan_gap).count(),
        }
    }
}

/// Metrics for one leakage variant: per-event records, per-metric vectors
/// in event order, and means ignoring undefined entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantMetrics {
    pub per_event: Vec<ResponseMetrics>,
    pub vectors: BTreeMap<Metric, Vec<Option<f64>>>,
    pub means: MetricMeans,
}

impl From<ResponseReport> for VariantMetrics {
    fn from(report: ResponseReport) -> Self {
        let vectors = Metric::ALL.iter().map(|&m| (m, report.vector(m))).collect();
        Self {
            per_event: report.per_event,
            vectors,
            means: report.means,
        }
    }
}

/// Events and scored metrics for one scope of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeAnalysis {
    pub scope: AnalysisScope,
    /// Outdoor percentile baseline events were scored against.
    pub baseline: Option<f64>,
    /// Detection thresholds per outdoor series; two entries for combined.
    pub thresholds: BTreeMap<Pollutant, f64>,
    pub events: Vec<Event>,
    pub stats: EventStats,
    pub variants: BTreeMap<Leakage, VariantMetrics>,
    /// Tight/leaky envelope of each metric mean.
    pub envelope: BTreeMap<Metric, Envelope>,
    /// Tight/leaky envelope per event, in event order.
    pub event_envelopes: Vec<BTreeMap<Metric, Envelope>>,
}

impl ScopeAnalysis {
    pub fn variant(&self, leakage: Leakage) -> Option<&VariantMetrics> {
        self.variants.get(&leakage)
    }

    /// Scalar aggregate for one metric under one variant.
    pub fn mean(&self, leakage: Leakage, metric: Metric) -> Option<f64> {
        self.variant(leakage).and_then(|v| v.means.get(metric))
    }
}

/// Bounded summary for one location × filter type × mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationSummary {
    pub key: ConfigurationKey,
    pub samples: usize,
    pub pm25: ScopeAnalysis,
    pub pm10: ScopeAnalysis,
    pub combined: ScopeAnalysis,
    pub notices: Vec<EnvelopeNotice>,
}

impl ConfigurationSummary {
    pub fn scope(&self, scope: AnalysisScope) -> &ScopeAnalysis {
        match scope {
            AnalysisScope::Single(Pollutant::Pm25) => &self.pm25,
            AnalysisScope::Single(Pollutant::Pm10) => &self.pm10,
            AnalysisScope::Combined => &self.combined,
        }
    }

    pub fn event_count(&self) -> usize {
        self.pm25.stats.count + self.pm10.stats.count + self.combined.stats.count
    }
}
