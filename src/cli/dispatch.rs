//! CLI dispatch
//!
//! Replays one session through the hook registry:
//! session start → every outcome line → session finish (enrichment).
//!
//! Whatever enrichment does, a run with valid arguments exits 0.

use crate::cli::{Args, OutcomeSource, Result, EXIT_SUCCESS};
use crate::collector::PhaseReport;
use crate::config::InsightConfig;
use crate::hooks::{standard_registry, Session};
use crate::pipeline::EnrichmentPipeline;
use std::io::{BufRead, BufReader};
use tracing::{error, info, warn};

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Run the replay and return the exit code
pub fn run_cli(args: Args) -> ExitCode {
    let config = match &args.config {
        Some(path) => match InsightConfig::from_file_and_env(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}, skipping AI analysis enrichment", e);
                return EXIT_SUCCESS;
            }
        },
        None => InsightConfig::from_env(),
    };

    let outcomes = match read_outcomes(&args.outcomes) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            warn!("Failed to read phase outcomes: {}", e);
            Vec::new()
        }
    };

    let (registry, collector, enrichment) =
        standard_registry(EnrichmentPipeline::from_config(&config));
    let session = Session::new(args.report.clone());

    registry.session_start(&session);
    for outcome in &outcomes {
        registry.phase_outcome(outcome);
    }
    info!(
        outcomes = outcomes.len(),
        failures = collector.len(),
        "Replayed test session"
    );
    registry.session_finish(&session);

    if let Some(outcome) = enrichment.take_last_outcome() {
        if let Some(summary) = outcome.success() {
            info!(matched = summary.matched, "Done");
        }
    }
    EXIT_SUCCESS
}

/// Parse a JSON-lines outcome log
///
/// Blank lines are ignored; malformed lines are logged and skipped.
pub fn read_outcomes(source: &OutcomeSource) -> Result<Vec<PhaseReport>> {
    match source {
        OutcomeSource::Stdin => parse_outcome_lines(std::io::stdin().lock()),
        OutcomeSource::File(path) => {
            parse_outcome_lines(BufReader::new(std::fs::File::open(path)?))
        }
    }
}

fn parse_outcome_lines<R: BufRead>(reader: R) -> Result<Vec<PhaseReport>> {
    let mut outcomes = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<PhaseReport>(&line) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => warn!(line = number + 1, "Skipping malformed outcome: {}", e),
        }
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{Phase, PhaseStatus};

    #[test]
    fn test_parse_outcome_lines_skips_bad_lines() {
        let input = concat!(
            r#"{"test_identifier":"t.py::a","phase":"call","status":"passed","duration":0.1}"#,
            "\n\n",
            "not json\n",
            r#"{"nodeid":"t.py::b","when":"setup","outcome":"failed","error_message":"boom"}"#,
            "\n"
        );
        let outcomes = parse_outcome_lines(input.as_bytes()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].phase, Phase::Setup);
        assert_eq!(outcomes[1].status, PhaseStatus::Failed);
    }

    #[test]
    fn test_read_outcomes_missing_file() {
        let source = OutcomeSource::File("/nonexistent/outcomes.jsonl".into());
        assert!(read_outcomes(&source).is_err());
    }
}
