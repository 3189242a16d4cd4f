use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AirshedError, Result};

/// Timestamp attached to a sample: a numeric index or a wall-clock instant.
///
/// Untagged on the wire, so JSON numbers become `Index` and RFC 3339
/// strings become `Wall`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Index(f64),
    Wall(DateTime<Utc>),
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Index(i) => write!(f, "{}", i),
            Timestamp::Wall(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

/// Default timestamps for a series of length `n`: `1..=n`.
pub fn default_timestamps(n: usize) -> Vec<Timestamp> {
    (1..=n).map(|i| Timestamp::Index(i as f64)).collect()
}

/// An ordered, fixed-length sample vector with one timestamp per sample.
///
/// Samples may be NaN (missing or invalid readings). The constructor is the
/// only place lengths are checked; everything downstream assumes alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    values: Vec<f64>,
    timestamps: Vec<Timestamp>,
}

impl Series {
    pub fn new(values: Vec<f64>, timestamps: Vec<Timestamp>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(AirshedError::alignment(
                "timestamps",
                values.len(),
                timestamps.len(),
            ));
        }
        Ok(Self { values, timestamps })
    }

    /// Build a series with default `1..=N` timestamps.
    pub fn from_values(values: Vec<f64>) -> Self {
        let timestamps = default_timestamps(values.len());
        Self { values, timestamps }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn timestamp(&self, idx: usize) -> Option<Timestamp> {
        self.timestamps.get(idx).copied()
    }

    /// Number of finite samples.
    pub fn finite_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Fraction of samples that are NaN or infinite. 0.0 for an empty series.
    pub fn missing_fraction(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        (self.len() - self.finite_count()) as f64 / self.len() as f64
    }
}

/// Deserialize a sample vector where `null` marks a missing reading.
///
/// JSON has no NaN literal, so missing samples arrive as `null` and are
/// stored as NaN.
pub fn deserialize_samples<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Optional variant of [`deserialize_samples`] for series that may be absent.
pub fn deserialize_optional_samples<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|v| v.into_iter().map(|s| s.unwrap_or(f64::NAN)).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_uses_one_based_timestamps() {
        let s = Series::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(s.timestamp(0), Some(Timestamp::Index(1.0)));
        assert_eq!(s.timestamp(2), Some(Timestamp::Index(3.0)));
        assert_eq!(s.timestamp(3), None);
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Series::new(vec![1.0, 2.0], default_timestamps(3)).unwrap_err();
        assert!(matches!(
            err,
            AirshedError::Alignment { expected: 2, actual: 3, .. }
        ));
    }

    #[test]
    fn missing_fraction_counts_nan_and_infinity() {
        let s = Series::from_values(vec![1.0, f64::NAN, f64::INFINITY, 4.0]);
        assert_eq!(s.finite_count(), 2);
        assert!((s.missing_fraction() - 0.5).abs() < 1e-12);
        assert_eq!(Series::from_values(vec![]).missing_fraction(), 0.0);
    }

    #[test]
    fn timestamps_deserialize_untagged() {
        let stamps: Vec<Timestamp> =
            serde_json::from_str(r#"[3, "2024-01-01T00:00:00Z"]"#).unwrap();
        assert_eq!(stamps[0], Timestamp::Index(3.0));
        assert!(matches!(stamps[1], Timestamp::Wall(_)));
        assert_eq!(stamps[1].to_string(), "2024-01-01T00:00:00+00:00");
    }
}
