use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AirshedError, Result};
use crate::event::{Leakage, Pollutant};
use crate::series::{
    default_timestamps, deserialize_optional_samples, deserialize_samples, Series, Timestamp,
};

/// Identifies one building/filter/operating-mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigurationKey {
    pub location: String,
    pub filter_type: String,
    pub mode: String,
}

impl ConfigurationKey {
    pub fn new(
        location: impl Into<String>,
        filter_type: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            filter_type: filter_type.into(),
            mode: mode.into(),
        }
    }
}

impl std::fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.location, self.filter_type, self.mode)
    }
}

/// Raw per-configuration input as supplied by the loader collaborator.
///
/// Indoor series are optional so that a configuration simulated under only
/// one leakage variant can still be described; the envelope step reports
/// the missing side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub location: String,
    pub filter_type: String,
    pub mode: String,
    #[serde(deserialize_with = "deserialize_samples")]
    pub outdoor_pm25: Vec<f64>,
    #[serde(deserialize_with = "deserialize_samples")]
    pub outdoor_pm10: Vec<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_samples")]
    pub indoor_pm25_tight: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "deserialize_optional_samples")]
    pub indoor_pm25_leaky: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "deserialize_optional_samples")]
    pub indoor_pm10_tight: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "deserialize_optional_samples")]
    pub indoor_pm10_leaky: Option<Vec<f64>>,
    /// Defaults to `1..=N` when absent.
    #[serde(default)]
    pub timestamps: Option<Vec<Timestamp>>,
}

impl ConfigurationRecord {
    pub fn new(key: ConfigurationKey, outdoor_pm25: Vec<f64>, outdoor_pm10: Vec<f64>) -> Self {
        Self {
            location: key.location,
            filter_type: key.filter_type,
            mode: key.mode,
            outdoor_pm25,
            outdoor_pm10,
            indoor_pm25_tight: None,
            indoor_pm25_leaky: None,
            indoor_pm10_tight: None,
            indoor_pm10_leaky: None,
            timestamps: None,
        }
    }

    pub fn with_indoor(mut self, pollutant: Pollutant, leakage: Leakage, values: Vec<f64>) -> Self {
        *self.indoor_slot(pollutant, leakage) = Some(values);
        self
    }

    pub fn with_timestamps(mut self, timestamps: Vec<Timestamp>) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    pub fn key(&self) -> ConfigurationKey {
        ConfigurationKey::new(&self.location, &self.filter_type, &self.mode)
    }

    fn indoor_slot(&mut self, pollutant: Pollutant, leakage: Leakage) -> &mut Option<Vec<f64>> {
        match (pollutant, leakage) {
            (Pollutant::Pm25, Leakage::Tight) => &mut self.indoor_pm25_tight,
            (Pollutant::Pm25, Leakage::Leaky) => &mut self.indoor_pm25_leaky,
            (Pollutant::Pm10, Leakage::Tight) => &mut self.indoor_pm10_tight,
            (Pollutant::Pm10, Leakage::Leaky) => &mut self.indoor_pm10_leaky,
        }
    }

    /// Check that every present series shares one length and build the
    /// aligned form the engine consumes.
    pub fn validate(self) -> Result<AlignedRecord> {
        let key = self.key();
        let n = self.outdoor_pm25.len();

        if self.outdoor_pm10.len() != n {
            return Err(AirshedError::alignment("outdoor_pm10", n, self.outdoor_pm10.len()));
        }

        let indoor_fields = [
            ("indoor_pm25_tight", Pollutant::Pm25, Leakage::Tight, self.indoor_pm25_tight),
            ("indoor_pm25_leaky", Pollutant::Pm25, Leakage::Leaky, self.indoor_pm25_leaky),
            ("indoor_pm10_tight", Pollutant::Pm10, Leakage::Tight, self.indoor_pm10_tight),
            ("indoor_pm10_leaky", Pollutant::Pm10, Leakage::Leaky, self.indoor_pm10_leaky),
        ];

        let mut indoor = BTreeMap::new();
        for (name, pollutant, leakage, values) in indoor_fields {
            if let Some(values) = values {
                if values.len() != n {
                    return Err(AirshedError::alignment(name, n, values.len()));
                }
                indoor.insert((pollutant, leakage), values);
            }
        }

        let timestamps = self.timestamps.unwrap_or_else(|| default_timestamps(n));
        let outdoor_pm25 = Series::new(self.outdoor_pm25, timestamps.clone())?;
        let outdoor_pm10 = Series::new(self.outdoor_pm10, timestamps)?;

        Ok(AlignedRecord {
            key,
            outdoor_pm25,
            outdoor_pm10,
            indoor,
        })
    }
}

/// A configuration whose series are known to share one index domain.
#[derive(Debug, Clone)]
pub struct AlignedRecord {
    pub key: ConfigurationKey,
    outdoor_pm25: Series,
    outdoor_pm10: Series,
    indoor: BTreeMap<(Pollutant, Leakage), Vec<f64>>,
}

impl AlignedRecord {
    pub fn len(&self) -> usize {
        self.outdoor_pm25.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outdoor_pm25.is_empty()
    }

    pub fn outdoor(&self, pollutant: Pollutant) -> &Series {
        match pollutant {
            Pollutant::Pm25 => &self.outdoor_pm25,
            Pollutant::Pm10 => &self.outdoor_pm10,
        }
    }

    pub fn indoor(&self, pollutant: Pollutant, leakage: Leakage) -> Option<&[f64]> {
        self.indoor.get(&(pollutant, leakage)).map(Vec::as_slice)
    }
}
