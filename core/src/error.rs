use thiserror::Error;

/// Every failure the analysis pipeline can surface to a caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Malformed URL, empty domain or blank topic. Raised before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Relay unreachable, non-success status or missing content.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("no content found to analyze")]
    EmptyContent,

    #[error("no keywords found to analyze")]
    NoKeywords,

    /// Some pages of a domain batch failed; the batch still carries the rest.
    #[error("{failed} of {total} pages could not be analyzed")]
    PartialBatch { failed: usize, total: usize },

    #[error("no pages could be analyzed ({total} attempted)")]
    TotalBatch { total: usize },
}

impl AnalysisError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        AnalysisError::Fetch { url: url.into(), reason: reason.to_string() }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
