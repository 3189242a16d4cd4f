//! End-to-end batch analysis: JSON records in, JSON report out.

use std::io::Write;

use airshed_compute::{analyze_batch, Metric};
use airshed_core::{AnalysisScope, ConfigurationKey, ConfigurationRecord, Leakage, Pollutant};
use airshed_params::{load_params, ResolvedParams};

const RECORDS: &str = r#"[
  {
    "location": "school",
    "filter_type": "hepa",
    "mode": "recirc",
    "outdoor_pm25": [5, 5, 5, 5, 40, 45, null, 42, 5, 5, 5, 5, 5, 5, 5, 5],
    "outdoor_pm10": [9, 9, 9, 9, 70, 80, 75, 72, 9, 9, 9, 9, 9, 9, 9, 9],
    "indoor_pm25_tight": [2, 2, 2, 2, 3, 5, 6, 5, 4, 3, 2, 2, 2, 2, 2, 2],
    "indoor_pm25_leaky": [3, 3, 3, 3, 6, 10, 12, 11, 8, 5, 3, 3, 3, 3, 3, 3],
    "indoor_pm10_tight": [4, 4, 4, 4, 6, 8, 9, 8, 6, 5, 4, 4, 4, 4, 4, 4],
    "indoor_pm10_leaky": [5, 5, 5, 5, 12, 18, 20, 17, 12, 8, 5, 5, 5, 5, 5, 5],
    "timestamps": [
      "2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z", "2024-01-01T02:00:00Z",
      "2024-01-01T03:00:00Z", "2024-01-01T04:00:00Z", "2024-01-01T05:00:00Z",
      "2024-01-01T06:00:00Z", "2024-01-01T07:00:00Z", "2024-01-01T08:00:00Z",
      "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z",
      "2024-01-01T12:00:00Z", "2024-01-01T13:00:00Z", "2024-01-01T14:00:00Z",
      "2024-01-01T15:00:00Z"
    ]
  },
  {
    "location": "clinic",
    "filter_type": "merv13",
    "mode": "fresh-air",
    "outdoor_pm25": [5, 5, 40],
    "outdoor_pm10": [9, 9]
  }
]"#;

fn records() -> Vec<ConfigurationRecord> {
    serde_json::from_str(RECORDS).expect("records parse")
}

#[test]
fn analyzes_aligned_records_and_skips_misaligned() {
    let report = analyze_batch(records(), &ResolvedParams::default());

    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].key, ConfigurationKey::new("clinic", "merv13", "fresh-air"));

    let summary = report
        .summary(&ConfigurationKey::new("school", "hepa", "recirc"))
        .expect("school summary");
    assert_eq!(summary.samples, 16);

    let pm25 = summary.scope(AnalysisScope::Single(Pollutant::Pm25));
    assert_eq!(pm25.events.len(), 1);
    let event = &pm25.events[0];
    assert_eq!((event.start, event.end), (4, 7));
    assert_eq!(event.peak_time, 5);
    assert!(event.quality.nan_gap);
    assert_eq!(event.start_time.to_string(), "2024-01-01T04:00:00+00:00");

    // Both variants present: every defined metric has a two-point envelope.
    for metric in [Metric::LagTime, Metric::PeakReduction, Metric::IntegratedReduction] {
        let tight = pm25.mean(Leakage::Tight, metric).expect("tight mean");
        let leaky = pm25.mean(Leakage::Leaky, metric).expect("leaky mean");
        let env = pm25.envelope[&metric];
        assert_eq!(env.lower, tight.min(leaky));
        assert_eq!(env.upper, tight.max(leaky));
        assert_eq!(env.mean, (tight + leaky) / 2.0);
    }

    // Leaky indoor air tracks outdoor more closely, so it is reduced less.
    let pr_tight = pm25.mean(Leakage::Tight, Metric::PeakReduction).unwrap();
    let pr_leaky = pm25.mean(Leakage::Leaky, Metric::PeakReduction).unwrap();
    assert!(pr_tight > pr_leaky);
    assert_eq!(pm25.mean(Leakage::Tight, Metric::LagTime), Some(1.0));

    assert!(!summary.combined.events.is_empty());
    assert_eq!(summary.combined.baseline, pm25.baseline);
}

#[test]
fn report_serializes_undefined_metrics_as_null() {
    let report = analyze_batch(records(), &ResolvedParams::default());
    let json = serde_json::to_value(&report).expect("report serializes");

    assert!(json["run_id"].is_string());
    let tight = &json["summaries"][0]["pm25"]["variants"]["tight"]["per_event"][0];
    // default lookahead is 24 samples, longer than what trails the event
    assert!(tight["recovery_time"].is_null());
    assert!(tight["peak_reduction"].is_number());
    assert_eq!(json["metrics"]["configurations_skipped"], 1);
}

#[test]
fn parameter_file_drives_the_batch() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(
        br#"
apiVersion: v1
kind: AnalysisParams
metadata:
  id: short-lookahead
  name: Short lookahead
spec:
  detection:
    min_duration_hours: 5
"#,
    )
    .expect("write params");

    let params = load_params(file.path()).expect("params load").resolve();
    assert_eq!(params.pm25.min_duration, 5);

    let report = analyze_batch(records(), &params);
    let summary = &report.summaries[0];
    // The PM2.5 event lasts four samples and is filtered out.
    assert!(summary.pm25.events.is_empty());
    assert!(summary.pm25.envelope.is_empty());
    assert_eq!(summary.pm10.events.len(), 0);
}
