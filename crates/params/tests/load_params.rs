//! Integration tests that load parameter bundles from disk and resolve them
//! into the sample-count form the engine consumes.

use std::io::Write;

use airshed_params::{load_params, BaselineStatistic, ParamsError, VariabilityMethod};

fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn load_full_bundle_and_resolve() {
    let file = write_yaml(
        r#"
apiVersion: v1
kind: AnalysisParams
metadata:
  id: winter-campaign
  name: Winter campaign
  tags: [winter, hepa]
spec:
  sampling:
    interval_hours: 0.5
  baseline:
    percentile: 10
  detection:
    threshold_multiplier_pm25: 2.5
    threshold_multiplier_pm10: 3.0
    min_duration_hours: 3
    min_separation_hours: 2
  response:
    lookahead_hours: 12
    recovery_factor: 1.2
  first_response:
    baseline_window_hours: 4
    baseline_statistic: mean
    variability_method: stdev
    abs_threshold: 1.5
    departure_multiplier: 2
  rtb:
    tolerance_fraction: 0.15
    hold_time_hours: 2
    min_data_hours: 4
"#,
    );

    let doc = load_params(file.path()).expect("bundle should load");
    assert_eq!(doc.metadata.id, "winter-campaign");

    let r = doc.resolve();
    assert_eq!(r.pm25.baseline_percentile, 10.0);
    assert_eq!(r.pm25.threshold_multiplier, 2.5);
    assert_eq!(r.pm10.threshold_multiplier, 3.0);
    assert_eq!(r.pm25.min_duration, 6);
    assert_eq!(r.pm25.min_separation, 4);
    assert_eq!(r.response.lookahead, 24);
    assert_eq!(r.response.recovery_factor, 1.2);
    // Untouched options keep their defaults, scaled to the half-hour interval.
    assert_eq!(r.response.pre_event, 12);
    assert_eq!(r.response.post_event, 24);
    assert_eq!(r.first_response.baseline_window, 8);
    assert_eq!(r.first_response.baseline_statistic, BaselineStatistic::Mean);
    assert_eq!(r.first_response.variability_method, VariabilityMethod::Stdev);
    assert_eq!(r.first_response.lookahead, 24);
    assert_eq!(r.rtb.hold, 4);
    assert_eq!(r.rtb.min_trailing, 8);
    assert_eq!(r.rtb.tolerance_fraction, 0.15);
}

#[test]
fn invalid_bundle_fails_with_validation_error() {
    let file = write_yaml(
        r#"
apiVersion: v2
kind: AnalysisParams
metadata:
  id: bad
  name: Bad
"#,
    );

    match load_params(file.path()) {
        Err(ParamsError::Validation(msg)) => assert!(msg.contains("apiVersion")),
        other => panic!("expected validation error, got {:?}", other),
    }
}
