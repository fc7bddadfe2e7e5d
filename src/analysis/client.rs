//! Analysis service client
//!
//! One `POST <base>/analyze-failures` per session. Every problem (missing
//! configuration, network error, bad status, unusable body) ends the
//! exchange as a skip or failure outcome with an empty index; nothing is
//! retried.

use crate::analysis::index::AnalysisIndex;
use crate::analysis::payload::{json_kind, AnalysisPayload, AnalyzeRequest, AnalyzeResponse, ResponseEntry};
use crate::analysis::transport::{SyncTransport, Transport};
use crate::collector::FailureRecord;
use crate::config::InsightConfig;
use crate::identifier::to_report_key;
use crate::outcome::{EnrichError, SkipReason, StageOutcome};
use tracing::{debug, error, info, warn};

/// Endpoint path appended to the base URL
pub const ANALYZE_PATH: &str = "/analyze-failures";

/// Client for the remote analysis service
#[derive(Debug)]
pub struct AnalysisClient {
    server_url: Option<String>,
    transport: Transport,
}

impl AnalysisClient {
    /// Client using the real HTTP transport
    pub fn new(config: &InsightConfig) -> Self {
        Self {
            server_url: config.server_url.clone(),
            transport: Transport::real(config.timeout_secs),
        }
    }

    /// Create client with custom transport (for testing)
    pub fn with_transport(server_url: Option<String>, transport: Transport) -> Self {
        Self {
            server_url,
            transport,
        }
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Full endpoint URL, if a base URL is configured
    pub fn endpoint(&self) -> Option<String> {
        self.server_url
            .as_deref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), ANALYZE_PATH))
    }

    /// Ask the service to analyse `failures`
    ///
    /// Preconditions (non-empty failures, configured endpoint, provider and
    /// model) are checked before any network I/O; unmet ones yield
    /// `Skipped`.
    pub fn analyze(
        &self,
        failures: &[FailureRecord],
        provider: &str,
        model: &str,
    ) -> StageOutcome<AnalysisIndex> {
        if failures.is_empty() {
            return StageOutcome::Skipped(SkipReason::NoFailures);
        }
        let Some(url) = self.endpoint() else {
            warn!("{}, skipping AI analysis enrichment", SkipReason::MissingServerUrl);
            return StageOutcome::Skipped(SkipReason::MissingServerUrl);
        };
        if provider.trim().is_empty() || model.trim().is_empty() {
            warn!("{}, skipping AI analysis enrichment", SkipReason::MissingAiSelection);
            return StageOutcome::Skipped(SkipReason::MissingAiSelection);
        }

        let body = match serde_json::to_string(&AnalyzeRequest {
            failures,
            ai_provider: provider,
            ai_model: model,
        }) {
            Ok(body) => body,
            Err(e) => return StageOutcome::Failed(EnrichError::Encode(e.to_string())),
        };

        info!(url = %url, failures = failures.len(), provider, model, "Requesting failure analysis");
        let headers = [("Content-Type", "application/json")];
        let response = match self.transport.post_json(&url, &headers, &body) {
            Ok(response) => response,
            Err(e) => {
                match e.response_body() {
                    Some(detail) => error!("Server request failed: {} Response: {}", e, detail),
                    None => error!("Server request failed: {}", e),
                }
                return StageOutcome::Failed(e.into());
            }
        };

        match parse_response(&response) {
            Ok(index) if index.is_empty() => {
                warn!("Analysis service returned no usable entries");
                StageOutcome::Skipped(SkipReason::EmptyAnalysis)
            }
            Ok(index) => {
                info!(entries = index.len(), "Received failure analysis");
                StageOutcome::Success(index)
            }
            Err(e) => {
                error!("{}", e);
                StageOutcome::Failed(e)
            }
        }
    }
}

/// Build the index from a response body
///
/// A body that is not a JSON object is an error; individual entries that
/// are malformed are skipped.
pub fn parse_response(body: &str) -> Result<AnalysisIndex, EnrichError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| EnrichError::InvalidResponse(format!("not JSON: {}", e)))?;
    if !value.is_object() {
        return Err(EnrichError::InvalidResponse(format!(
            "expected an object, got {}",
            json_kind(&value)
        )));
    }
    let response: AnalyzeResponse = serde_json::from_value(value)
        .map_err(|e| EnrichError::InvalidResponse(e.to_string()))?;

    let mut index = AnalysisIndex::new();
    for (position, raw) in response.failures.into_iter().enumerate() {
        let entry: ResponseEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(position, "Skipping malformed analysis entry: {}", e);
                continue;
            }
        };
        let test_name = match entry.test_name {
            Some(serde_json::Value::String(name)) if !name.is_empty() => name,
            _ => {
                debug!(position, "Skipping analysis entry without test_name");
                continue;
            }
        };
        let Some(analysis) = entry.analysis else {
            debug!(test = %test_name, "Skipping analysis entry without analysis");
            continue;
        };
        match AnalysisPayload::from_value(analysis) {
            Ok(payload) => {
                index.insert(to_report_key(&test_name), payload);
            }
            Err(e) => debug!(test = %test_name, "Skipping analysis entry: {}", e),
        }
    }
    Ok(index)
}
