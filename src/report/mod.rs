//! JUnit report enrichment
//!
//! Document model, analysis injection, and the guarded rewrite.

pub mod document;
pub mod inject;
pub mod mutator;
pub mod writer;

use std::path::PathBuf;

pub use document::{Element, Node, ReportDocument};
pub use inject::{format_analysis_text, inject_analysis, OUTPUT_DELIMITER};
pub use mutator::{backup_path, EnrichSummary, ReportMutator, BACKUP_SUFFIX};
pub use writer::{atomic_write, FsReportWriter, ReportWriter};

/// Report rewrite errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed report: {0}")]
    Malformed(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report rewrite panicked: {0}")]
    Panicked(String),

    #[error("Failed to write report: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to create backup {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to restore report from {}: {source}", .path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
