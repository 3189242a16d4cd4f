//! Two-point envelopes over the tight and leaky leakage variants.
//!
//! The envelope is `(mean, min, max)` of the two variant values. It is not a
//! statistical interval, and a missing side is never filled from the other.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use airshed_core::{AnalysisScope, ConfigurationKey, Leakage};

use super::response::{Metric, ResponseReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Envelope {
    pub fn from_pair(a: f64, b: f64) -> Self {
        Self {
            mean: (a + b) / 2.0,
            lower: a.min(b),
            upper: a.max(b),
        }
    }
}

/// Only one leakage variant produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("envelope incomplete: {available} variant has a value, {missing} does not")]
pub struct IncompleteEnvelope {
    pub available: Leakage,
    pub missing: Leakage,
}

/// Fold a tight/leaky pair. Both sides undefined is simply undefined;
/// exactly one side defined is an [`IncompleteEnvelope`].
pub fn fold(
    tight: Option<f64>,
    leaky: Option<f64>,
) -> std::result::Result<Option<Envelope>, IncompleteEnvelope> {
    match (tight, leaky) {
        (Some(t), Some(l)) => Ok(Some(Envelope::from_pair(t, l))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(IncompleteEnvelope {
            available: Leakage::Tight,
            missing: Leakage::Leaky,
        }),
        (None, Some(_)) => Err(IncompleteEnvelope {
            available: Leakage::Leaky,
            missing: Leakage::Tight,
        }),
    }
}

/// Warning-level report that an aggregate was omitted because one variant
/// had nothing to contribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeNotice {
    pub config: ConfigurationKey,
    pub scope: AnalysisScope,
    /// `None` when the whole variant is absent rather than a single metric.
    pub metric: Option<Metric>,
    pub available: Leakage,
    pub missing: Leakage,
    pub message: String,
}

/// Folds variant reports for one configuration and scope, collecting a
/// notice for every omitted aggregate.
#[derive(Debug)]
pub struct EnvelopeAggregator {
    config: ConfigurationKey,
    scope: AnalysisScope,
    notices: Vec<EnvelopeNotice>,
}

impl EnvelopeAggregator {
    pub fn new(config: ConfigurationKey, scope: AnalysisScope) -> Self {
        Self {
            config,
            scope,
            notices: Vec::new(),
        }
    }

    fn notify(&mut self, metric: Option<Metric>, gap: IncompleteEnvelope) {
        let message = match metric {
            Some(m) => format!("{m}: {gap}"),
            None => format!("no {} indoor series: {gap}", gap.missing),
        };
        warn!(
            config = %self.config,
            scope = %self.scope,
            missing = %gap.missing,
            "{message}"
        );
        self.notices.push(EnvelopeNotice {
            config: self.config.clone(),
            scope: self.scope,
            metric,
            available: gap.available,
            missing: gap.missing,
            message,
        });
    }

    /// Envelope of the per-metric means.
    pub fn aggregate(
        &mut self,
        tight: Option<&ResponseReport>,
        leaky: Option<&ResponseReport>,
    ) -> BTreeMap<Metric, Envelope> {
        let mut out = BTreeMap::new();
        match (tight, leaky) {
            (Some(t), Some(l)) => {
                for metric in Metric::ALL {
                    match fold(t.means.get(metric), l.means.get(metric)) {
                        Ok(Some(env)) => {
                            out.insert(metric, env);
                        }
                        Ok(None) => {}
                        Err(gap) => self.notify(Some(metric), gap),
                    }
                }
            }
            (None, None) => {}
            (t, _) => {
                let available = if t.is_some() { Leakage::Tight } else { Leakage::Leaky };
                self.notify(
                    None,
                    IncompleteEnvelope {
                        available,
                        missing: available.other(),
                    },
                );
            }
        }
        out
    }

    /// Envelopes of paired per-event values. Events where only one side is
    /// defined get no entry for that metric; the aggregate notice covers them.
    pub fn per_event(
        &self,
        tight: Option<&ResponseReport>,
        leaky: Option<&ResponseReport>,
    ) -> Vec<BTreeMap<Metric, Envelope>> {
        let (Some(t), Some(l)) = (tight, leaky) else {
            return Vec::new();
        };
        t.per_event
            .iter()
            .zip(&l.per_event)
            .map(|(te, le)| {
                Metric::ALL
                    .iter()
                    .filter_map(|&m| match fold(te.value(m), le.value(m)) {
                        Ok(Some(env)) => Some((m, env)),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    pub fn notices(&self) -> &[EnvelopeNotice] {
        &self.notices
    }

    pub fn into_notices(self) -> Vec<EnvelopeNotice> {
        self.notices
    }
}
