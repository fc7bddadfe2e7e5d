//! Report writers
//!
//! The filesystem writer replaces the report with write+fsync+rename so a
//! crash mid-write never leaves a truncated file behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination for the serialised report
pub trait ReportWriter {
    fn write_report(&self, path: &Path, content: &[u8]) -> io::Result<()>;
}

/// Atomic filesystem writer
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReportWriter;

impl ReportWriter for FsReportWriter {
    fn write_report(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        atomic_write(path, content)
    }
}

/// Sibling path with `suffix` appended to the file name
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Atomically replace `path` with `content`
///
/// 1. Write to a temporary sibling
/// 2. fsync
/// 3. Rename over target (atomic on POSIX)
///
/// The temporary file is removed if any step fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = sibling_with_suffix(path, ".tmp");
    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(&temp_path, metadata.permissions())?;
        }
        fs::rename(&temp_path, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sibling_with_suffix() {
        assert_eq!(
            sibling_with_suffix(Path::new("/a/report.xml"), ".bak"),
            PathBuf::from("/a/report.xml.bak")
        );
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.xml");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!sibling_with_suffix(&path, ".tmp").exists());
    }

    #[test]
    fn test_atomic_write_missing_parent_fails_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("report.xml");
        assert!(atomic_write(&path, b"x").is_err());
        assert!(!path.exists());
    }
}
