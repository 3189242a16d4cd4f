//! Analysis parameter bundles.
//!
//! This crate provides:
//! - The YAML `AnalysisParams` document with a default for every option
//! - Resolution of hour-valued options into sample counts for the engine
//! - Validation with path-addressed errors and warnings
//! - A filesystem loader

pub mod loader;
pub mod resolved;
pub mod schema;
pub mod validation;

pub use loader::{load_params, parse_params, ParamsError};
pub use resolved::{
    DetectionSettings, FirstResponseSettings, ResolvedParams, ResponseSettings,
    ReturnToBaselineSettings,
};
pub use schema::{AnalysisParams, AnalysisParamsSpec, BaselineStatistic, VariabilityMethod};
pub use validation::{validate_analysis_params, ValidationResult};
