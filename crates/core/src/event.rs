use serde::{Deserialize, Serialize};

use crate::series::Timestamp;

/// Quality flags attached to a detected event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuality {
    /// The event absorbed one or more adjacent candidate runs.
    pub merged: bool,
    /// Reserved; always false for events that survive filtering.
    pub short: bool,
    /// At least one non-finite sample lies inside `[start, end]`.
    pub nan_gap: bool,
}

/// A contiguous interval where a series exceeds its threshold.
///
/// `start` and `end` are inclusive 0-based sample indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub start: usize,
    pub end: usize,
    pub duration: usize,
    /// Index of the first maximum within `[start, end]`.
    pub peak_time: usize,
    pub peak_value: f64,
    pub baseline: f64,
    /// Same value as `baseline`; kept as a separate outdoor-specific slot.
    pub baseline_out: f64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub peak_timestamp: Timestamp,
    pub quality: EventQuality,
}

impl Event {
    /// Whether `idx` falls inside the event.
    pub fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx <= self.end
    }

    /// Replace both baseline slots.
    pub fn rebase(&mut self, baseline: f64) {
        self.baseline = baseline;
        self.baseline_out = baseline;
    }
}

/// Which particulate fraction a series measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    Pm25,
    Pm10,
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pollutant::Pm25 => write!(f, "PM2.5"),
            Pollutant::Pm10 => write!(f, "PM10"),
        }
    }
}

/// Which detection an event set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisScope {
    Single(Pollutant),
    /// PM2.5 and PM10 jointly above threshold.
    Combined,
}

impl std::fmt::Display for AnalysisScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisScope::Single(p) => write!(f, "{p}"),
            AnalysisScope::Combined => write!(f, "PM2.5+PM10"),
        }
    }
}

/// Building leakage variant of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leakage {
    Tight,
    Leaky,
}

impl Leakage {
    pub const ALL: [Leakage; 2] = [Leakage::Tight, Leakage::Leaky];

    pub fn other(self) -> Self {
        match self {
            Leakage::Tight => Leakage::Leaky,
            Leakage::Leaky => Leakage::Tight,
        }
    }
}

impl std::fmt::Display for Leakage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leakage::Tight => write!(f, "tight"),
            Leakage::Leaky => write!(f, "leaky"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            start: 3,
            end: 5,
            duration: 3,
            peak_time: 3,
            peak_value: 9.0,
            baseline: 1.0,
            baseline_out: 1.0,
            start_time: Timestamp::Index(4.0),
            end_time: Timestamp::Index(6.0),
            peak_timestamp: Timestamp::Index(4.0),
            quality: EventQuality::default(),
        }
    }

    #[test]
    fn contains_is_inclusive() {
        let e = sample_event();
        assert!(!e.contains(2));
        assert!(e.contains(3));
        assert!(e.contains(5));
        assert!(!e.contains(6));
    }

    #[test]
    fn rebase_sets_both_slots() {
        let mut e = sample_event();
        e.rebase(2.5);
        assert_eq!(e.baseline, 2.5);
        assert_eq!(e.baseline_out, 2.5);
    }

    #[test]
    fn scope_labels() {
        assert_eq!(AnalysisScope::Single(Pollutant::Pm25).to_string(), "PM2.5");
        assert_eq!(AnalysisScope::Combined.to_string(), "PM2.5+PM10");
        assert_eq!(serde_json::to_string(&AnalysisScope::Combined).unwrap(), "\"combined\"");
    }

    #[test]
    fn leakage_other_flips() {
        assert_eq!(Leakage::Tight.other(), Leakage::Leaky);
        assert_eq!(Leakage::Leaky.other(), Leakage::Tight);
        assert_eq!(serde_json::to_string(&Leakage::Leaky).unwrap(), "\"leaky\"");
    }
}
