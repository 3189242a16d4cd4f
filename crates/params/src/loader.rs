//! Parameter bundle loading from YAML.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::schema::AnalysisParams;
use crate::validation::validate_analysis_params;

/// Errors that can occur while loading a parameter bundle.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// One or more blocking validation errors.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for parameter operations.
pub type Result<T> = std::result::Result<T, ParamsError>;

/// Parse and validate a parameter document from a YAML string.
///
/// Validation warnings are logged; errors are returned.
pub fn parse_params(yaml: &str) -> Result<AnalysisParams> {
    let doc: AnalysisParams = serde_yaml::from_str(yaml)?;
    let result = validate_analysis_params(&doc);

    for w in &result.warnings {
        warn!(id = %doc.metadata.id, path = %w.path, "{}", w.message);
    }
    if !result.valid {
        return Err(ParamsError::Validation(result.error_summary()));
    }

    Ok(doc)
}

/// Read, parse and validate a parameter document from disk.
pub fn load_params(path: &Path) -> Result<AnalysisParams> {
    let yaml = fs::read_to_string(path)?;
    let doc = parse_params(&yaml)?;
    info!(path = %path.display(), id = %doc.metadata.id, "analysis parameters loaded");
    Ok(doc)
}
