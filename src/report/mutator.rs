//! Guarded report rewrite
//!
//! 1. copy the report to `<report>.bak`
//! 2. parse
//! 3. inject analysis into matching testcases
//! 4. serialise and write back
//!
//! If 2-4 fail the report is restored from the backup and the backup is
//! removed before the error is returned. On success the backup is removed.
//! A backup that survives a run means restoration itself failed.

use crate::analysis::AnalysisIndex;
use crate::collector::panic_message;
use crate::identifier::ReportKey;
use crate::report::document::ReportDocument;
use crate::report::inject::inject_analysis;
use crate::report::writer::{sibling_with_suffix, FsReportWriter, ReportWriter};
use crate::report::ReportError;
use std::collections::HashSet;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Suffix of the transient backup file
pub const BACKUP_SUFFIX: &str = ".bak";

/// What a successful rewrite touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Testcase entries that received analysis
    pub matched: usize,
    /// Index keys that matched no testcase
    pub unmatched: usize,
}

/// Backup path for a report
pub fn backup_path(report_path: &Path) -> PathBuf {
    sibling_with_suffix(report_path, BACKUP_SUFFIX)
}

/// Report rewriter
#[derive(Debug, Clone, Default)]
pub struct ReportMutator<W = FsReportWriter> {
    writer: W,
}

impl ReportMutator<FsReportWriter> {
    pub fn new() -> Self {
        Self {
            writer: FsReportWriter,
        }
    }
}

impl<W: ReportWriter> ReportMutator<W> {
    /// Create mutator with custom writer (for testing)
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Enrich the report at `report_path` in place
    pub fn enrich(
        &self,
        report_path: &Path,
        index: &AnalysisIndex,
    ) -> Result<EnrichSummary, ReportError> {
        if !report_path.is_file() {
            return Err(ReportError::NotFound(report_path.to_path_buf()));
        }

        let backup = backup_path(report_path);
        if backup.exists() {
            warn!(backup = %backup.display(), "Stale report backup found, overwriting");
        }
        if let Err(source) = fs::copy(report_path, &backup) {
            let _ = fs::remove_file(&backup);
            return Err(ReportError::Backup {
                path: backup,
                source,
            });
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.rewrite(report_path, index)))
            .unwrap_or_else(|payload| Err(ReportError::Panicked(panic_message(payload.as_ref()))));
        match result {
            Ok(summary) => {
                if let Err(e) = fs::remove_file(&backup) {
                    warn!(backup = %backup.display(), "Failed to remove report backup: {}", e);
                }
                info!(
                    report = %report_path.display(),
                    matched = summary.matched,
                    "Enriched report with AI analysis"
                );
                Ok(summary)
            }
            Err(e) => {
                restore(report_path, &backup)?;
                Err(e)
            }
        }
    }

    fn rewrite(&self, report_path: &Path, index: &AnalysisIndex) -> Result<EnrichSummary, ReportError> {
        let content = fs::read_to_string(report_path)?;
        let mut document = ReportDocument::parse(&content)?;

        let mut seen: HashSet<ReportKey> = HashSet::new();
        let mut matched = 0;
        document.for_each_testcase_mut(|testcase| {
            let key = ReportKey::new(
                testcase.attribute("classname").unwrap_or_default(),
                testcase.attribute("name").unwrap_or_default(),
            );
            if let Some(analysis) = index.get(&key) {
                inject_analysis(testcase, analysis);
                matched += 1;
                seen.insert(key);
            }
        });

        let unmatched = index.keys().filter(|k| !seen.contains(*k)).count();
        if unmatched > 0 {
            debug!(unmatched, "Analysis entries without a matching testcase");
        }

        let xml = document.to_xml()?;
        self.writer
            .write_report(report_path, &xml)
            .map_err(ReportError::Write)?;
        Ok(EnrichSummary { matched, unmatched })
    }
}

/// Put the backup back in place of the report
fn restore(report_path: &Path, backup: &Path) -> Result<(), ReportError> {
    if fs::rename(backup, report_path).is_ok() {
        return Ok(());
    }
    // Rename can fail across odd mounts; fall back to copy + remove
    match fs::copy(backup, report_path) {
        Ok(_) => {
            if let Err(e) = fs::remove_file(backup) {
                warn!(backup = %backup.display(), "Failed to remove report backup: {}", e);
            }
            Ok(())
        }
        Err(source) => {
            error!(
                report = %report_path.display(),
                backup = %backup.display(),
                "Failed to restore report from backup: {}",
                source
            );
            Err(ReportError::Restore {
                path: backup.to_path_buf(),
                source,
            })
        }
    }
}
