use shared_types::ExtractionMethod;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("{method} extraction failed: {cause}")]
    ExtractionFailed {
        method: ExtractionMethod,
        cause: String,
    },

    #[error("Extraction produced no usable text")]
    EmptyText,
}

impl ExtractError {
    pub fn failed(method: ExtractionMethod, cause: impl Into<String>) -> Self {
        ExtractError::ExtractionFailed {
            method,
            cause: cause.into(),
        }
    }
}
