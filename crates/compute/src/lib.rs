pub mod algorithms;
pub mod pipeline;

pub use algorithms::{
    CombinedEventDetector, DetectionOutcome, Envelope, EnvelopeAggregator, EnvelopeNotice,
    IncompleteEnvelope, Metric, MetricMeans, ResponseMetrics, ResponseMetricsCalculator,
    ResponseReport, ThresholdEventDetector,
};
pub use pipeline::{
    analyze_batch, BatchReport, ConfigurationSummary, EventStats, Pipeline, PipelineMetrics,
    ScopeAnalysis, SkippedConfiguration, VariantMetrics,
};
