//! Parameter validation with structured errors and warnings.
//!
//! Errors block loading; warnings are advisory and logged by the loader.

use serde::{Deserialize, Serialize};

use crate::resolved::hours_to_samples;
use crate::schema::AnalysisParams;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted location, e.g. `"spec.rtb.tolerance_fraction"`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// All error messages joined into one line.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub(crate) fn is_kebab_case(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut prev_was_hyphen = true;
    for ch in s.chars() {
        if ch == '-' {
            if prev_was_hyphen {
                return false;
            }
            prev_was_hyphen = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            prev_was_hyphen = false;
        } else {
            return false;
        }
    }
    !prev_was_hyphen
}

fn require_positive(result: &mut ValidationResult, path: &str, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        result.error(path, format!("must be a positive finite number, got {}", value));
    }
}

fn require_non_negative(result: &mut ValidationResult, path: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        result.error(path, format!("must be a non-negative finite number, got {}", value));
    }
}

// ── AnalysisParams validation ───────────────────────────────────────

pub fn validate_analysis_params(doc: &AnalysisParams) -> ValidationResult {
    let mut result = ValidationResult::new();

    if doc.api_version != "v1" {
        result.error(
            "apiVersion",
            format!("apiVersion must be 'v1', got '{}'", doc.api_version),
        );
    }
    if doc.kind != "AnalysisParams" {
        result.error(
            "kind",
            format!("kind must be 'AnalysisParams', got '{}'", doc.kind),
        );
    }
    if !is_kebab_case(&doc.metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                doc.metadata.id
            ),
        );
    }

    let spec = &doc.spec;
    let dt = spec.sampling.interval_hours;
    require_positive(&mut result, "spec.sampling.interval_hours", dt);

    let p = spec.baseline.percentile;
    if !(p.is_finite() && (0.0..=100.0).contains(&p)) {
        result.error(
            "spec.baseline.percentile",
            format!("percentile must lie in [0, 100], got {}", p),
        );
    }

    // Detection.
    let d = &spec.detection;
    for (path, m) in [
        ("spec.detection.threshold_multiplier_pm25", d.threshold_multiplier_pm25),
        ("spec.detection.threshold_multiplier_pm10", d.threshold_multiplier_pm10),
    ] {
        require_positive(&mut result, path, m);
        if m.is_finite() && m > 0.0 && m < 1.0 {
            result.warn(
                path,
                format!("multiplier {} puts the threshold below the baseline", m),
            );
        }
    }
    require_non_negative(&mut result, "spec.detection.min_separation_hours", d.min_separation_hours);
    if hours_to_samples(d.min_duration_hours, dt) == 0 {
        result.error(
            "spec.detection.min_duration_hours",
            format!(
                "min_duration_hours {} resolves to zero samples at interval {}",
                d.min_duration_hours, dt
            ),
        );
    }

    // Response.
    let r = &spec.response;
    require_positive(&mut result, "spec.response.lookahead_hours", r.lookahead_hours);
    require_positive(&mut result, "spec.response.recovery_factor", r.recovery_factor);
    require_non_negative(&mut result, "spec.response.pre_event_hours", r.pre_event_hours);
    require_non_negative(&mut result, "spec.response.post_event_hours", r.post_event_hours);
    if r.lookahead_hours.is_finite() && r.lookahead_hours < r.post_event_hours {
        result.warn(
            "spec.response.lookahead_hours",
            format!(
                "lookahead ({}h) is shorter than the post-event window ({}h)",
                r.lookahead_hours, r.post_event_hours
            ),
        );
    }

    // First response.
    let f = &spec.first_response;
    require_non_negative(&mut result, "spec.first_response.abs_threshold", f.abs_threshold);
    require_non_negative(
        &mut result,
        "spec.first_response.departure_multiplier",
        f.departure_multiplier,
    );
    if hours_to_samples(f.baseline_window_hours, dt) == 0 {
        result.warn(
            "spec.first_response.baseline_window_hours",
            "baseline window resolves to zero samples; first response will be undefined for every event"
                .to_string(),
        );
    }

    // Return to baseline.
    let t = &spec.rtb;
    if !(t.tolerance_fraction.is_finite() && (0.0..1.0).contains(&t.tolerance_fraction)) {
        result.error(
            "spec.rtb.tolerance_fraction",
            format!("tolerance_fraction must lie in [0, 1), got {}", t.tolerance_fraction),
        );
    }
    if hours_to_samples(t.hold_time_hours, dt) == 0 {
        result.error(
            "spec.rtb.hold_time_hours",
            format!("hold_time_hours {} resolves to zero samples", t.hold_time_hours),
        );
    }
    require_non_negative(&mut result, "spec.rtb.min_data_hours", t.min_data_hours);
    if t.hold_time_hours > r.lookahead_hours {
        result.warn(
            "spec.rtb.hold_time_hours",
            format!(
                "hold time ({}h) exceeds lookahead ({}h); return to baseline can never be reached",
                t.hold_time_hours, r.lookahead_hours
            ),
        );
    }

    result
}
