//! Test identifier translation
//!
//! Maps a hierarchical test identifier (`path/to/file.ext::Group::test[param]`)
//! to the flat `(classname, name)` pair a JUnit report addresses testcases by.
//!
//! This pair is the only join key between collected failures and report
//! entries. An identifier that translates to a key no testcase carries is
//! simply not enriched.

use std::fmt;

/// Separator between identifier segments
pub const SEGMENT_SEPARATOR: &str = "::";

/// Separator used inside a JUnit `classname`
pub const GROUP_SEPARATOR: char = '.';

/// JUnit testcase address: `classname` + `name` attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportKey {
    /// `classname` attribute (dotted module path plus optional group)
    pub group: String,
    /// `name` attribute (final segment, parameter suffix included)
    pub name: String,
}

impl ReportKey {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.group, self.name)
    }
}

/// Translate a test identifier into its report key
///
/// - `a/b.py::test_x` → `("a.b", "test_x")`
/// - `a/b.py::Group::test_x[p]` → `("a.b.Group", "test_x[p]")`
/// - anything else → `("", identifier)`
///
/// Total and deterministic. Identifiers with three or more separators
/// (nested groups) take the fallback on purpose.
pub fn to_report_key(identifier: &str) -> ReportKey {
    let parts: Vec<&str> = identifier.split(SEGMENT_SEPARATOR).collect();
    match parts.as_slice() {
        [path, name] => ReportKey::new(path_to_group(path), *name),
        [path, group, name] => ReportKey::new(
            format!("{}{}{}", path_to_group(path), GROUP_SEPARATOR, group),
            *name,
        ),
        _ => ReportKey::new("", identifier),
    }
}

/// `tests/sub/test_foo.py` → `tests.sub.test_foo`
fn path_to_group(path: &str) -> String {
    let stem_end = match path.rfind(['/', '\\']) {
        Some(sep) => extension_start(&path[sep + 1..]).map(|dot| sep + 1 + dot),
        None => extension_start(path),
    };
    let without_ext = match stem_end {
        Some(end) => &path[..end],
        None => path,
    };
    without_ext.replace(['/', '\\'], &GROUP_SEPARATOR.to_string())
}

/// Byte offset of the extension dot in a file name, ignoring leading dots
fn extension_start(file_name: &str) -> Option<usize> {
    match file_name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(dot),
    }
}
