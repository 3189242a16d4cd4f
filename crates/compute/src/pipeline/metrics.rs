use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Batch run metrics, updated once per `analyze_batch` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineMetrics {
    /// Configurations scored in the last run.
    pub configurations_analyzed: u64,
    /// Configurations rejected before scoring (alignment violations).
    pub configurations_skipped: u64,
    /// Events detected across all scopes in the last run.
    pub events_detected: u64,
    /// Envelope notices raised in the last run.
    pub envelope_notices: u64,
    /// Configurations scored per second in the last run.
    pub configurations_per_second: f64,

    /// When the last run completed.
    pub last_run: Option<DateTime<Utc>>,
    /// Duration of the last run in milliseconds.
    pub last_duration_ms: u64,
}

/// Per-run tallies handed to [`PipelineMetrics::record_run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounts {
    pub analyzed: u64,
    pub skipped: u64,
    pub events: u64,
    pub notices: u64,
}

impl PipelineMetrics {
    /// Record completion of a batch run.
    pub fn record_run(&mut self, counts: RunCounts, elapsed: Duration) {
        self.configurations_analyzed = counts.analyzed;
        self.configurations_skipped = counts.skipped;
        self.events_detected = counts.events;
        self.envelope_notices = counts.notices;

        let secs = elapsed.as_secs_f64();
        self.configurations_per_second = if secs > 0.0 {
            counts.analyzed as f64 / secs
        } else {
            0.0
        };

        self.last_run = Some(Utc::now());
        self.last_duration_ms = elapsed.as_millis() as u64;
    }

    /// Start a timer for one batch run.
    pub fn run_timer(&self) -> RunTimer {
        RunTimer {
            start: Instant::now(),
        }
    }
}

/// A scoped timer for batch runs.
pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    /// Finalize the timer and record metrics.
    pub fn finish(self, metrics: &mut PipelineMetrics, counts: RunCounts) {
        metrics.record_run(counts, self.start.elapsed());
    }
}
