//! Per-configuration analysis pipeline.
//!
//! For one aligned configuration:
//!
//! - **Detection**: PM2.5 and PM10 events on the outdoor series, plus
//!   combined events where both exceed their thresholds.
//! - **Scoring**: response metrics, first response and return-to-baseline
//!   for every event under each available leakage variant.
//! - **Envelope**: tight/leaky bounds for every metric, with notices where
//!   only one variant has a value.

pub mod batch;
pub mod metrics;
pub mod summary;

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use airshed_core::{AlignedRecord, AnalysisScope, Event, Leakage, Pollutant};
use airshed_params::ResolvedParams;

use crate::algorithms::baseline::local_baseline;
use crate::algorithms::combined::{rebase_events, CombinedEventDetector};
use crate::algorithms::detection::{DetectionOutcome, ThresholdEventDetector};
use crate::algorithms::envelope::{EnvelopeAggregator, EnvelopeNotice};
use crate::algorithms::first_response::first_response;
use crate::algorithms::response::{ResponseMetricsCalculator, ResponseReport};
use crate::algorithms::return_to_baseline::time_to_return;

pub use self::batch::{analyze_batch, BatchReport, SkippedConfiguration};
pub use self::metrics::PipelineMetrics;
pub use self::summary::{ConfigurationSummary, EventStats, ScopeAnalysis, VariantMetrics};

/// Stateless analysis of aligned configurations under one parameter set.
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: ResolvedParams,
}

impl Pipeline {
    pub fn new(params: ResolvedParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.params
    }

    /// Detect, score and envelope every scope of one configuration.
    pub fn analyze(&self, record: &AlignedRecord) -> ConfigurationSummary {
        let mut notices = Vec::new();

        let pm25 = self.detect(record, Pollutant::Pm25);
        let pm10 = self.detect(record, Pollutant::Pm10);
        let combined = self.detect_combined(record, &pm25, &pm10);

        let pm25 = self.score_single(record, Pollutant::Pm25, pm25, &mut notices);
        let pm10 = self.score_single(record, Pollutant::Pm10, pm10, &mut notices);
        let combined = self.score(record, combined, &mut notices);

        info!(
            config = %record.key,
            samples = record.len(),
            pm25_missing = record.outdoor(Pollutant::Pm25).missing_fraction(),
            pm10_missing = record.outdoor(Pollutant::Pm10).missing_fraction(),
            pm25_events = pm25.stats.count,
            pm10_events = pm10.stats.count,
            combined_events = combined.stats.count,
            notices = notices.len(),
            "configuration analyzed"
        );

        ConfigurationSummary {
            key: record.key.clone(),
            samples: record.len(),
            pm25,
            pm10,
            combined,
            notices,
        }
    }

    fn detect(&self, record: &AlignedRecord, pollutant: Pollutant) -> DetectionOutcome {
        ThresholdEventDetector::new(*self.params.detection(pollutant)).detect(record.outdoor(pollutant))
    }

    /// Joint PM2.5/PM10 detection with thresholds taken from the single
    /// pollutant passes, rebased to the PM2.5 percentile baseline.
    fn detect_combined(
        &self,
        record: &AlignedRecord,
        pm25: &DetectionOutcome,
        pm10: &DetectionOutcome,
    ) -> ScopeInput {
        let mut input = ScopeInput {
            scope: AnalysisScope::Combined,
            pollutant: Pollutant::Pm25,
            baseline: pm25.baseline,
            thresholds: BTreeMap::new(),
            events: Vec::new(),
        };

        let (Some(threshold_a), Some(threshold_b), Some(baseline)) =
            (pm25.threshold, pm10.threshold, pm25.baseline)
        else {
            debug!(config = %record.key, "combined detection skipped: undefined threshold");
            return input;
        };
        input.thresholds.insert(Pollutant::Pm25, threshold_a);
        input.thresholds.insert(Pollutant::Pm10, threshold_b);

        let mut events = CombinedEventDetector::new(threshold_a, threshold_b, self.params.pm25.min_duration)
            .with_placeholder_multiplier(self.params.pm25.threshold_multiplier)
            .with_max_missing_gap(self.params.pm25.max_missing_gap())
            .detect(
                record.outdoor(Pollutant::Pm25),
                record.outdoor(Pollutant::Pm10).values(),
            );
        rebase_events(&mut events, baseline);
        input.events = events;
        input
    }

    fn score_single(
        &self,
        record: &AlignedRecord,
        pollutant: Pollutant,
        outcome: DetectionOutcome,
        notices: &mut Vec<EnvelopeNotice>,
    ) -> ScopeAnalysis {
        let thresholds = outcome
            .threshold
            .map(|t| BTreeMap::from([(pollutant, t)]))
            .unwrap_or_default();
        let input = ScopeInput {
            scope: AnalysisScope::Single(pollutant),
            pollutant,
            baseline: outcome.baseline,
            thresholds,
            events: outcome.events,
        };
        self.score(record, input, notices)
    }

    /// Score one event set under every available leakage variant and fold
    /// the variants into envelopes.
    fn score(
        &self,
        record: &AlignedRecord,
        input: ScopeInput,
        notices: &mut Vec<EnvelopeNotice>,
    ) -> ScopeAnalysis {
        let outdoor = record.outdoor(input.pollutant).values();

        let reports: BTreeMap<Leakage, ResponseReport> = Leakage::ALL
            .par_iter()
            .filter_map(|&leakage| {
                let indoor = record.indoor(input.pollutant, leakage)?;
                Some((leakage, self.score_variant(&input.events, outdoor, indoor)))
            })
            .collect();

        let tight = reports.get(&Leakage::Tight);
        let leaky = reports.get(&Leakage::Leaky);
        let mut aggregator = EnvelopeAggregator::new(record.key.clone(), input.scope);
        let envelope = aggregator.aggregate(tight, leaky);
        let event_envelopes = aggregator.per_event(tight, leaky);
        notices.extend(aggregator.into_notices());

        ScopeAnalysis {
            scope: input.scope,
            baseline: input.baseline,
            thresholds: input.thresholds,
            stats: EventStats::from_events(&input.events),
            events: input.events,
            variants: reports.into_iter().map(|(l, r)| (l, r.into())).collect(),
            envelope,
            event_envelopes,
        }
    }

    /// Full per-event metrics for one indoor series.
    fn score_variant(&self, events: &[Event], outdoor: &[f64], indoor: &[f64]) -> ResponseReport {
        let fr = &self.params.first_response;
        let rtb = &self.params.rtb;
        let local = |idx: usize| local_baseline(indoor, idx, fr.baseline_window, fr.baseline_statistic);

        let mut report = ResponseMetricsCalculator::new(self.params.response).compute(events, outdoor, indoor);
        report
            .per_event
            .par_iter_mut()
            .zip(events.par_iter())
            .for_each(|(metrics, event)| {
                metrics.response_time = first_response(event, indoor, fr);
                metrics.return_to_baseline_time = time_to_return(event, indoor, &local, rtb);
            });
        report.refresh_means();
        report
    }
}

/// Detected events awaiting scoring.
struct ScopeInput {
    scope: AnalysisScope,
    /// Series pairing used for scoring.
    pollutant: Pollutant,
    baseline: Option<f64>,
    thresholds: BTreeMap<Pollutant, f64>,
    events: Vec<Event>,
}
