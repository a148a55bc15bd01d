use doc_extract::ExtractError;
use thiserror::Error;

/// Failure of a whole-document analysis. Extraction is the only stage that
/// can fail; segmentation, classification and scoring are total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

impl AnalysisError {
    pub fn as_extraction(&self) -> &ExtractError {
        match self {
            AnalysisError::Extraction(e) => e,
        }
    }
}
