use thiserror::Error;

/// Errors from the refresh path only. Evaluation itself is total: unknown
/// flags resolve to the off-state and malformed percentages are clamped, so
/// the evaluator has no error type.
#[derive(Error, Debug)]
pub enum FlagRefreshError {
    #[error("failed to fetch flag payload: {0}")]
    FetchFailed(String),
    #[error("failed to parse flag payload: {0}")]
    DataParsingError(#[from] serde_json::Error),
}
