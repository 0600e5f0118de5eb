use thiserror::Error;

/// Failures of a single analysis round-trip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Network failure, timeout or an unparseable response
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with an `error` payload
    #[error("{0}")]
    Remote(String),

    /// The caller cancelled the request before it resolved
    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalysisError::Transport(format!("request timed out: {}", err))
        } else {
            AnalysisError::Transport(err.to_string())
        }
    }
}
