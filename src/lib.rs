//! junit-insight: AI failure analysis for JUnit XML reports
//!
//! Collects failures during a test session, asks a remote analysis
//! service about them once at session end, and folds the answers into the
//! session's JUnit report. The report is either left exactly as the runner
//! wrote it or gains only additional analysis fields; enrichment never
//! changes the outcome of the test run.

pub mod analysis;
pub mod cli;
pub mod collector;
pub mod config;
pub mod hooks;
pub mod identifier;
pub mod outcome;
pub mod pipeline;
pub mod report;

// Re-export the session-facing surface
pub use analysis::{AnalysisClient, AnalysisIndex, AnalysisPayload, FakeTransport, Transport};
pub use collector::{FailureCollector, FailureRecord, Phase, PhaseOutcome, PhaseReport, PhaseStatus};
pub use config::InsightConfig;
pub use hooks::{
    standard_registry, CollectorHook, EnrichmentHook, HookPriority, HookRegistry, LifecycleHook,
    Session,
};
pub use identifier::{to_report_key, ReportKey};
pub use outcome::{EnrichError, SkipReason, StageOutcome};
pub use pipeline::{EnrichmentPipeline, PipelineOutcome};
pub use report::{EnrichSummary, ReportDocument, ReportError, ReportMutator};
