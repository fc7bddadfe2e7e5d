//! Stage outcomes
//!
//! Every enrichment stage reports success, a skip, or a failure. Nothing
//! here is ever turned into an `Err` for the host session.

use crate::analysis::TransportError;
use crate::report::ReportError;
use std::fmt;
use std::path::PathBuf;

/// Why a stage did nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No failures were collected this session
    NoFailures,
    /// Service base URL not configured
    MissingServerUrl,
    /// AI provider or model not configured
    MissingAiSelection,
    /// The service returned no usable analysis entries
    EmptyAnalysis,
    /// The session has no report file, or it is gone
    ReportMissing(Option<PathBuf>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoFailures => write!(f, "no failures collected"),
            SkipReason::MissingServerUrl => write!(
                f,
                "{} not set",
                crate::config::ENV_SERVER_URL
            ),
            SkipReason::MissingAiSelection => write!(
                f,
                "{} and {} must be set",
                crate::config::ENV_AI_PROVIDER,
                crate::config::ENV_AI_MODEL
            ),
            SkipReason::EmptyAnalysis => write!(f, "no analysis returned"),
            SkipReason::ReportMissing(None) => write!(f, "no report file configured"),
            SkipReason::ReportMissing(Some(path)) => {
                write!(f, "report file {} does not exist", path.display())
            }
        }
    }
}

/// Stage failures
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Remote call failed (network, timeout, non-2xx)
    #[error("Server request failed: {0}")]
    Transport(#[from] TransportError),

    /// Remote call succeeded but the body is unusable
    #[error("Invalid analysis response: {0}")]
    InvalidResponse(String),

    /// Request could not be serialised
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// Report rewrite failed (the original was restored)
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A stage panicked
    #[error("Enrichment panicked: {0}")]
    Panic(String),
}

/// Result of one stage
#[derive(Debug)]
pub enum StageOutcome<T> {
    Success(T),
    Skipped(SkipReason),
    Failed(EnrichError),
}

impl<T> StageOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            StageOutcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EnrichError> {
        match self {
            StageOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            StageOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Carry a non-success outcome over to another stage's type
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> StageOutcome<U> {
        match self {
            StageOutcome::Success(value) => StageOutcome::Success(f(value)),
            StageOutcome::Skipped(reason) => StageOutcome::Skipped(reason),
            StageOutcome::Failed(err) => StageOutcome::Failed(err),
        }
    }
}

impl<T: Default> StageOutcome<T> {
    /// Success value, or the empty value for skips and failures
    pub fn unwrap_or_empty(self) -> T {
        self.success().unwrap_or_default()
    }
}
