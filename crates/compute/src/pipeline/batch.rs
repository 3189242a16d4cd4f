//! Parallel analysis of many configurations.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use airshed_core::{AirshedError, ConfigurationKey, ConfigurationRecord};
use airshed_params::ResolvedParams;

use crate::algorithms::envelope::EnvelopeNotice;

use super::metrics::{PipelineMetrics, RunCounts};
use super::summary::ConfigurationSummary;
use super::Pipeline;

/// A configuration rejected before analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedConfiguration {
    pub key: ConfigurationKey,
    pub reason: String,
}

/// Result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Sorted by configuration key.
    pub summaries: Vec<ConfigurationSummary>,
    pub skipped: Vec<SkippedConfiguration>,
    /// Every envelope notice raised by any configuration.
    pub notices: Vec<EnvelopeNotice>,
    pub metrics: PipelineMetrics,
}

impl BatchReport {
    pub fn summary(&self, key: &ConfigurationKey) -> Option<&ConfigurationSummary> {
        self.summaries
            .binary_search_by(|s| s.key.cmp(key))
            .ok()
            .map(|i| &self.summaries[i])
    }
}

/// Validate and analyze every record in parallel. Misaligned records are
/// skipped with a warning; the rest of the batch continues.
pub fn analyze_batch(records: Vec<ConfigurationRecord>, params: &ResolvedParams) -> BatchReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let mut metrics = PipelineMetrics::default();
    let timer = metrics.run_timer();

    info!(%run_id, configurations = records.len(), "batch analysis started");

    let pipeline = Pipeline::new(params.clone());
    let outcomes: Vec<std::result::Result<ConfigurationSummary, (ConfigurationKey, AirshedError)>> =
        records
            .into_par_iter()
            .map(|record| {
                let key = record.key();
                record
                    .validate()
                    .map(|aligned| pipeline.analyze(&aligned))
                    .map_err(|e| (key, e))
            })
            .collect();

    let mut summaries = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err((key, e)) => {
                warn!(config = %key, error = %e, "configuration skipped");
                skipped.push(SkippedConfiguration {
                    key,
                    reason: e.to_string(),
                });
            }
        }
    }
    summaries.sort_by(|a, b| a.key.cmp(&b.key));

    let notices: Vec<EnvelopeNotice> = summaries
        .iter()
        .flat_map(|s| s.notices.iter().cloned())
        .collect();
    let counts = RunCounts {
        analyzed: summaries.len() as u64,
        skipped: skipped.len() as u64,
        events: summaries.iter().map(|s| s.event_count() as u64).sum(),
        notices: notices.len() as u64,
    };
    timer.finish(&mut metrics, counts);

    info!(
        %run_id,
        analyzed = counts.analyzed,
        skipped = counts.skipped,
        events = counts.events,
        notices = counts.notices,
        duration_ms = metrics.last_duration_ms,
        "batch analysis complete"
    );

    BatchReport {
        run_id,
        started_at,
        summaries,
        skipped,
        notices,
        metrics,
    }
}
