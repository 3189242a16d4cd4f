//! AnalysisParams document: detection thresholds, response windows,
//! first-response and return-to-baseline criteria.

use serde::{Deserialize, Serialize};

// ── Shared enums ────────────────────────────────────────────────────

/// Central-tendency statistic for local pre-event baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineStatistic {
    Mean,
    Median,
}

/// Dispersion statistic for local pre-event variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariabilityMethod {
    /// Sample standard deviation.
    Stdev,
    /// Median absolute deviation scaled to match stdev under normality.
    Mad,
}

// ── YAML-level types ────────────────────────────────────────────────

/// Document metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParamsMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Top-level AnalysisParams document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisParams {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ParamsMetadata,
    #[serde(default)]
    pub spec: AnalysisParamsSpec,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "AnalysisParams".to_string(),
            metadata: ParamsMetadata {
                id: "default".to_string(),
                name: "Default analysis parameters".to_string(),
                description: None,
                tags: None,
            },
            spec: AnalysisParamsSpec::default(),
        }
    }
}

/// Specification section. Every section and field is optional in YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisParamsSpec {
    #[serde(default)]
    pub sampling: SamplingParams,
    #[serde(default)]
    pub baseline: BaselineParams,
    #[serde(default)]
    pub detection: DetectionParams,
    #[serde(default)]
    pub response: ResponseParams,
    #[serde(default)]
    pub first_response: FirstResponseParams,
    #[serde(default)]
    pub rtb: ReturnToBaselineParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SamplingParams {
    /// Hours between consecutive samples.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BaselineParams {
    /// Whole-series percentile used as the detection baseline.
    #[serde(default = "default_percentile")]
    pub percentile: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetectionParams {
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier_pm25: f64,
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier_pm10: f64,
    /// Shorter runs are discarded.
    #[serde(default = "default_min_duration_hours")]
    pub min_duration_hours: f64,
    /// Runs separated by at most this gap are merged.
    #[serde(default = "default_min_separation_hours")]
    pub min_separation_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResponseParams {
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: f64,
    /// Recovery is reached below `pre-event baseline × recovery_factor`.
    #[serde(default = "default_recovery_factor")]
    pub recovery_factor: f64,
    #[serde(default = "default_pre_event_hours")]
    pub pre_event_hours: f64,
    #[serde(default = "default_post_event_hours")]
    pub post_event_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FirstResponseParams {
    #[serde(default = "default_baseline_window_hours")]
    pub baseline_window_hours: f64,
    #[serde(default = "default_baseline_statistic")]
    pub baseline_statistic: BaselineStatistic,
    #[serde(default = "default_variability_method")]
    pub variability_method: VariabilityMethod,
    /// Absolute departure floor, in concentration units.
    #[serde(default = "default_abs_threshold")]
    pub abs_threshold: f64,
    #[serde(default = "default_departure_multiplier")]
    pub departure_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReturnToBaselineParams {
    #[serde(default = "default_tolerance_fraction")]
    pub tolerance_fraction: f64,
    #[serde(default = "default_hold_time_hours")]
    pub hold_time_hours: f64,
    #[serde(default = "default_min_data_hours")]
    pub min_data_hours: f64,
}

fn default_interval_hours() -> f64 {
    1.0
}

fn default_percentile() -> f64 {
    20.0
}

fn default_threshold_multiplier() -> f64 {
    2.0
}

fn default_min_duration_hours() -> f64 {
    2.0
}

fn default_min_separation_hours() -> f64 {
    1.0
}

fn default_lookahead_hours() -> f64 {
    24.0
}

fn default_recovery_factor() -> f64 {
    1.1
}

fn default_pre_event_hours() -> f64 {
    6.0
}

fn default_post_event_hours() -> f64 {
    12.0
}

fn default_baseline_window_hours() -> f64 {
    6.0
}

fn default_baseline_statistic() -> BaselineStatistic {
    BaselineStatistic::Median
}

fn default_variability_method() -> VariabilityMethod {
    VariabilityMethod::Mad
}

fn default_abs_threshold() -> f64 {
    2.0
}

fn default_departure_multiplier() -> f64 {
    3.0
}

fn default_tolerance_fraction() -> f64 {
    0.1
}

fn default_hold_time_hours() -> f64 {
    3.0
}

fn default_min_data_hours() -> f64 {
    6.0
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
        }
    }
}

impl Default for BaselineParams {
    fn default() -> Self {
        Self {
            percentile: default_percentile(),
        }
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            threshold_multiplier_pm25: default_threshold_multiplier(),
            threshold_multiplier_pm10: default_threshold_multiplier(),
            min_duration_hours: default_min_duration_hours(),
            min_separation_hours: default_min_separation_hours(),
        }
    }
}

impl Default for ResponseParams {
    fn default() -> Self {
        Self {
            lookahead_hours: default_lookahead_hours(),
            recovery_factor: default_recovery_factor(),
            pre_event_hours: default_pre_event_hours(),
            post_event_hours: default_post_event_hours(),
        }
    }
}

impl Default for FirstResponseParams {
    fn default() -> Self {
        Self {
            baseline_window_hours: default_baseline_window_hours(),
            baseline_statistic: default_baseline_statistic(),
            variability_method: default_variability_method(),
            abs_threshold: default_abs_threshold(),
            departure_multiplier: default_departure_multiplier(),
        }
    }
}

impl Default for ReturnToBaselineParams {
    fn default() -> Self {
        Self {
            tolerance_fraction: default_tolerance_fraction(),
            hold_time_hours: default_hold_time_hours(),
            min_data_hours: default_min_data_hours(),
        }
    }
}
