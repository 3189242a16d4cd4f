//! Event detection and indoor-response scoring over aligned sample series.

pub mod baseline;
pub mod combined;
pub mod detection;
pub mod envelope;
pub mod first_response;
pub mod response;
pub mod return_to_baseline;

pub use combined::CombinedEventDetector;
pub use detection::{DetectionOutcome, ThresholdEventDetector};
pub use envelope::{Envelope, EnvelopeAggregator, EnvelopeNotice, IncompleteEnvelope};
pub use first_response::first_response;
pub use response::{Metric, MetricMeans, ResponseMetrics, ResponseMetricsCalculator, ResponseReport};
pub use return_to_baseline::time_to_return;
