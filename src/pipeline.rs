//! Enrichment pipeline
//!
//! Runs once at session end:
//!
//! ```text
//!   failures ──▶ AnalysisClient (one POST) ──▶ ReportMutator (one guarded rewrite)
//! ```
//!
//! Each stage yields a [`StageOutcome`]. The pipeline logs skips and
//! failures and hands the final outcome back for inspection, but never
//! turns it into an error or a panic for the host session.

use crate::analysis::AnalysisClient;
use crate::collector::{panic_message, FailureRecord};
use crate::config::InsightConfig;
use crate::outcome::{EnrichError, SkipReason, StageOutcome};
use crate::report::{EnrichSummary, FsReportWriter, ReportMutator, ReportWriter};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Final outcome of a pipeline run
pub type PipelineOutcome = StageOutcome<EnrichSummary>;

/// Analysis client + report mutator, wired for one session end
#[derive(Debug)]
pub struct EnrichmentPipeline<W = FsReportWriter> {
    client: AnalysisClient,
    mutator: ReportMutator<W>,
    ai_provider: String,
    ai_model: String,
}

impl EnrichmentPipeline<FsReportWriter> {
    /// Pipeline talking to the configured service over HTTP
    pub fn from_config(config: &InsightConfig) -> Self {
        Self::new(AnalysisClient::new(config), ReportMutator::new(), config)
    }
}

impl<W: ReportWriter> EnrichmentPipeline<W> {
    pub fn new(client: AnalysisClient, mutator: ReportMutator<W>, config: &InsightConfig) -> Self {
        Self {
            client,
            mutator,
            ai_provider: config.provider().to_string(),
            ai_model: config.model().to_string(),
        }
    }

    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    /// Run the pipeline; never fails and never panics
    pub fn run(&self, failures: &[FailureRecord], report_path: Option<&Path>) -> PipelineOutcome {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_stages(failures, report_path)))
            .unwrap_or_else(|payload| {
                StageOutcome::Failed(EnrichError::Panic(panic_message(payload.as_ref())))
            });

        match &outcome {
            StageOutcome::Success(summary) => info!(
                matched = summary.matched,
                unmatched = summary.unmatched,
                "AI analysis enrichment complete"
            ),
            StageOutcome::Skipped(reason @ SkipReason::ReportMissing(_)) => {
                warn!("Skipping AI analysis enrichment: {}", reason)
            }
            StageOutcome::Skipped(reason @ SkipReason::NoFailures) => {
                info!("Skipping AI analysis enrichment: {}", reason)
            }
            // The client already logged its own skips and failures
            StageOutcome::Skipped(reason) => debug!("Skipping AI analysis enrichment: {}", reason),
            StageOutcome::Failed(e @ (EnrichError::Report(_) | EnrichError::Panic(_))) => {
                error!("Failed to enrich JUnit XML, original preserved: {}", e)
            }
            StageOutcome::Failed(e) => debug!("AI analysis unavailable: {}", e),
        }
        outcome
    }

    fn run_stages(&self, failures: &[FailureRecord], report_path: Option<&Path>) -> PipelineOutcome {
        if failures.is_empty() {
            return StageOutcome::Skipped(SkipReason::NoFailures);
        }
        let report_path = match report_path {
            Some(path) if path.is_file() => path,
            other => {
                return StageOutcome::Skipped(SkipReason::ReportMissing(
                    other.map(Path::to_path_buf),
                ))
            }
        };

        let index = match self.client.analyze(failures, &self.ai_provider, &self.ai_model) {
            StageOutcome::Success(index) => index,
            other => return other.map(|_| EnrichSummary::default()),
        };

        match self.mutator.enrich(report_path, &index) {
            Ok(summary) => StageOutcome::Success(summary),
            Err(e) => StageOutcome::Failed(e.into()),
        }
    }
}
