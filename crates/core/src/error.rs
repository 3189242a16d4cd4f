use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirshedError {
    /// Series of one configuration disagree in length.
    #[error("Alignment violation: {what} has length {actual}, expected {expected}")]
    Alignment {
        what: String,
        expected: usize,
        actual: usize,
    },
}

impl AirshedError {
    pub fn alignment(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::Alignment {
            what: what.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, AirshedError>;
