//! Sample-count parameters consumed by the engine.
//!
//! Hour-valued options are converted once here so engine components never
//! see hours or optional fields.

use serde::{Deserialize, Serialize};

use airshed_core::Pollutant;

use crate::schema::{AnalysisParams, BaselineStatistic, VariabilityMethod};

/// Threshold detection settings for one pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub baseline_percentile: f64,
    pub threshold_multiplier: f64,
    pub min_duration: usize,
    pub min_separation: usize,
}

impl DetectionSettings {
    /// Longest missing-only stretch bridged inside a run. A single missing
    /// sample never splits an event.
    pub fn max_missing_gap(&self) -> usize {
        self.min_separation.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseSettings {
    pub lookahead: usize,
    pub recovery_factor: f64,
    /// Samples before `start` averaged into the indoor pre-event baseline.
    pub pre_event: usize,
    /// Samples after `end` included in the response window.
    pub post_event: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstResponseSettings {
    pub baseline_window: usize,
    pub baseline_statistic: BaselineStatistic,
    pub variability_method: VariabilityMethod,
    pub abs_threshold: f64,
    pub departure_multiplier: f64,
    pub lookahead: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnToBaselineSettings {
    pub tolerance_fraction: f64,
    pub hold: usize,
    pub lookahead: usize,
    pub min_trailing: usize,
}

/// Fully populated parameter set in sample units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParams {
    pub pm25: DetectionSettings,
    pub pm10: DetectionSettings,
    pub response: ResponseSettings,
    pub first_response: FirstResponseSettings,
    pub rtb: ReturnToBaselineSettings,
}

impl ResolvedParams {
    pub fn detection(&self, pollutant: Pollutant) -> &DetectionSettings {
        match pollutant {
            Pollutant::Pm25 => &self.pm25,
            Pollutant::Pm10 => &self.pm10,
        }
    }
}

impl Default for ResolvedParams {
    fn default() -> Self {
        AnalysisParams::default().resolve()
    }
}

/// Convert a duration in hours to a whole number of samples.
pub fn hours_to_samples(hours: f64, interval_hours: f64) -> usize {
    if !(hours.is_finite() && interval_hours.is_finite()) || interval_hours <= 0.0 {
        return 0;
    }
    (hours / interval_hours).round().max(0.0) as usize
}

impl AnalysisParams {
    /// Resolve hour-valued options into sample counts.
    pub fn resolve(&self) -> ResolvedParams {
        let spec = &self.spec;
        let dt = spec.sampling.interval_hours;
        let samples = |hours: f64| hours_to_samples(hours, dt);

        let detection = |multiplier: f64| DetectionSettings {
            baseline_percentile: spec.baseline.percentile,
            threshold_multiplier: multiplier,
            min_duration: samples(spec.detection.min_duration_hours),
            min_separation: samples(spec.detection.min_separation_hours),
        };
        let lookahead = samples(spec.response.lookahead_hours);

        ResolvedParams {
            pm25: detection(spec.detection.threshold_multiplier_pm25),
            pm10: detection(spec.detection.threshold_multiplier_pm10),
            response: ResponseSettings {
                lookahead,
                recovery_factor: spec.response.recovery_factor,
                pre_event: samples(spec.response.pre_event_hours),
                post_event: samples(spec.response.post_event_hours),
            },
            first_response: FirstResponseSettings {
                baseline_window: samples(spec.first_response.baseline_window_hours),
                baseline_statistic: spec.first_response.baseline_statistic,
                variability_method: spec.first_response.variability_method,
                abs_threshold: spec.first_response.abs_threshold,
                departure_multiplier: spec.first_response.departure_multiplier,
                lookahead,
            },
            rtb: ReturnToBaselineSettings {
                tolerance_fraction: spec.rtb.tolerance_fraction,
                hold: samples(spec.rtb.hold_time_hours),
                lookahead,
                min_trailing: samples(spec.rtb.min_data_hours),
            },
        }
    }
}
