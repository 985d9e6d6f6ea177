//! Error taxonomy surfaced by [`crate::CascadeInspector::analyze`].

use thiserror::Error;

/// Why an analysis failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The selector matched nothing before the wait expired.
    #[error("no element matches `{selector}` after {timeout_ms}ms")]
    ElementNotFound { selector: String, timeout_ms: u64 },
    /// The page or the inspection backend could not be reached.
    #[error("session for {url} unavailable: {reason}")]
    SessionUnavailable { url: String, reason: String },
    /// An optional stage failed; the rest of the analysis is still valid.
    #[error("partial analysis failure: {reason}")]
    PartialAnalysisFailure { reason: String },
}

impl AnalysisError {
    /// Translate a collaborator transport error for `url`.
    pub(crate) fn session(url: &str, err: &anyhow::Error) -> Self {
        Self::SessionUnavailable {
            url: url.to_owned(),
            reason: format!("{err:#}"),
        }
    }
}
