//! Failure collection
//!
//! Accumulates one [`FailureRecord`] per non-passing test phase during a
//! session. Owned by whoever drives the session (usually via
//! [`crate::hooks::CollectorHook`]) and shared by reference with the
//! per-test callbacks.
//!
//! Recording never fails from the caller's point of view: a record whose
//! details cannot be extracted is logged and dropped.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Test phase a failure was observed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Fixture / setup code
    Setup,
    /// Test body
    Call,
    /// Fixture teardown
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
        };
        f.write_str(s)
    }
}

/// Outcome status of a test phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Passed,
    Skipped,
    Failed,
}

/// Error extracting failure details from a host outcome
#[derive(Debug, thiserror::Error)]
#[error("Cannot extract {field} for {test}: {message}")]
pub struct ExtractError {
    pub test: String,
    pub field: &'static str,
    pub message: String,
}

/// Host runner's view of one finished test phase
///
/// Detail accessors are fallible: the host may not be able to render an
/// exception or traceback. They are only called for non-passing outcomes.
pub trait PhaseOutcome {
    /// Stable hierarchical identifier (`file::Group::test[param]`)
    fn test_identifier(&self) -> &str;

    fn phase(&self) -> Phase;

    /// Phase duration in seconds
    fn duration(&self) -> f64;

    fn status(&self) -> PhaseStatus;

    fn error_message(&self) -> Result<String, ExtractError>;

    fn stack_trace(&self) -> Result<String, ExtractError>;
}

/// Captured failure, serialised as-is into the analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(rename = "test_name")]
    pub test_identifier: String,
    pub error_message: String,
    pub stack_trace: String,
    pub duration: f64,
    #[serde(default = "failed_status")]
    pub status: String,
    pub phase: Phase,
}

fn failed_status() -> String {
    "FAILED".to_string()
}

impl FailureRecord {
    /// Extract a record from a non-passing outcome
    pub fn from_outcome(outcome: &dyn PhaseOutcome) -> Result<Self, ExtractError> {
        Ok(Self {
            test_identifier: outcome.test_identifier().to_string(),
            error_message: outcome.error_message()?,
            stack_trace: outcome.stack_trace()?,
            duration: outcome.duration(),
            status: failed_status(),
            phase: outcome.phase(),
        })
    }
}

/// Concrete phase outcome, as replayed from a JSON-lines outcome log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    #[serde(alias = "nodeid", alias = "test_name")]
    pub test_identifier: String,
    #[serde(alias = "when")]
    pub phase: Phase,
    #[serde(default)]
    pub duration: f64,
    #[serde(alias = "outcome")]
    pub status: PhaseStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
}

impl PhaseReport {
    pub fn passed(test_identifier: impl Into<String>, phase: Phase, duration: f64) -> Self {
        Self {
            test_identifier: test_identifier.into(),
            phase,
            duration,
            status: PhaseStatus::Passed,
            error_message: None,
            stack_trace: None,
        }
    }

    pub fn failed(
        test_identifier: impl Into<String>,
        phase: Phase,
        duration: f64,
        error_message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            test_identifier: test_identifier.into(),
            phase,
            duration,
            status: PhaseStatus::Failed,
            error_message: Some(error_message.into()),
            stack_trace: Some(stack_trace.into()),
        }
    }
}

impl PhaseOutcome for PhaseReport {
    fn test_identifier(&self) -> &str {
        &self.test_identifier
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn status(&self) -> PhaseStatus {
        self.status
    }

    fn error_message(&self) -> Result<String, ExtractError> {
        Ok(self.error_message.clone().unwrap_or_default())
    }

    fn stack_trace(&self) -> Result<String, ExtractError> {
        Ok(self.stack_trace.clone().unwrap_or_default())
    }
}

/// Session-scoped failure accumulator
///
/// `record` may be called concurrently from parallel test workers; every
/// call appends at most one record.
#[derive(Debug, Default)]
pub struct FailureCollector {
    records: Mutex<Vec<FailureRecord>>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session start: drop everything from a previous session
    pub fn reset(&self) {
        self.records.lock().clear();
    }

    /// Record a phase outcome if it did not pass
    ///
    /// Returns whether a record was appended. Extraction errors and panics
    /// raised by the host's accessors are logged and swallowed.
    pub fn record(&self, outcome: &dyn PhaseOutcome) -> bool {
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            if outcome.status() == PhaseStatus::Passed {
                return Ok(None);
            }
            FailureRecord::from_outcome(outcome).map(Some)
        }));

        match extracted {
            Ok(Ok(Some(record))) => {
                debug!(test = %record.test_identifier, phase = %record.phase, "Collected failure");
                self.records.lock().push(record);
                true
            }
            Ok(Ok(None)) => false,
            Ok(Err(e)) => {
                warn!("Failed to collect failure data: {}", e);
                false
            }
            Err(payload) => {
                warn!(
                    "Failed to collect failure data: panic while extracting details: {}",
                    panic_message(payload.as_ref())
                );
                false
            }
        }
    }

    /// Copy of the records collected so far
    pub fn snapshot(&self) -> Vec<FailureRecord> {
        self.records.lock().clone()
    }

    /// Move the records out, leaving the collector empty
    pub fn take(&self) -> Vec<FailureRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_outcome_not_recorded() {
        let collector = FailureCollector::new();
        let recorded = collector.record(&PhaseReport::passed("t.py::test_a", Phase::Call, 0.1));
        assert!(!recorded);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_skipped_outcome_recorded() {
        let collector = FailureCollector::new();
        let mut report = PhaseReport::passed("t.py::test_a", Phase::Setup, 0.0);
        report.status = PhaseStatus::Skipped;
        report.error_message = Some("skipped: no db".to_string());
        assert!(collector.record(&report));

        let records = collector.snapshot();
        assert_eq!(records[0].error_message, "skipped: no db");
        assert_eq!(records[0].status, "FAILED");
    }

    #[test]
    fn test_failed_outcome_recorded() {
        let collector = FailureCollector::new();
        let report = PhaseReport::failed("t.py::test_a", Phase::Teardown, 0.5, "boom", "trace");
        assert!(collector.record(&report));

        let records = collector.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].test_identifier, "t.py::test_a");
        assert_eq!(records[0].error_message, "boom");
        assert_eq!(records[0].stack_trace, "trace");
        assert_eq!(records[0].phase, Phase::Teardown);
        assert_eq!(records[0].status, "FAILED");
    }

    #[test]
    fn test_reset_clears() {
        let collector = FailureCollector::new();
        collector.record(&PhaseReport::failed("t.py::a", Phase::Call, 0.0, "e", "s"));
        collector.reset();
        assert!(collector.is_empty());
    }

    #[test]
    fn test_take_empties() {
        let collector = FailureCollector::new();
        collector.record(&PhaseReport::failed("t.py::a", Phase::Call, 0.0, "e", "s"));
        assert_eq!(collector.take().len(), 1);
        assert_eq!(collector.len(), 0);
    }

    #[test]
    fn test_record_serialises_wire_names() {
        let record = FailureRecord {
            test_identifier: "t.py::a".to_string(),
            error_message: "e".to_string(),
            stack_trace: "s".to_string(),
            duration: 1.5,
            status: "FAILED".to_string(),
            phase: Phase::Setup,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["test_name"], "t.py::a");
        assert_eq!(json["phase"], "setup");
        assert_eq!(json["status"], "FAILED");
        assert_eq!(json["duration"], 1.5);
    }

    #[test]
    fn test_phase_report_accepts_runner_aliases() {
        let line = r#"{"nodeid":"t.py::a","when":"call","outcome":"failed","error_message":"x"}"#;
        let report: PhaseReport = serde_json::from_str(line).unwrap();
        assert_eq!(report.phase, Phase::Call);
        assert_eq!(report.status, PhaseStatus::Failed);
        assert_eq!(report.stack_trace, None);
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "non-string panic payload");
    }
}
