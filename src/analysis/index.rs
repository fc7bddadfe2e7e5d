//! Analysis index: report key → analysis payload

use crate::analysis::payload::AnalysisPayload;
use crate::identifier::ReportKey;
use std::collections::HashMap;

/// Lookup table used by the report rewrite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisIndex {
    entries: HashMap<ReportKey, AnalysisPayload>,
}

impl AnalysisIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing any previous payload for the key
    pub fn insert(&mut self, key: ReportKey, payload: AnalysisPayload) -> Option<AnalysisPayload> {
        self.entries.insert(key, payload)
    }

    pub fn get(&self, key: &ReportKey) -> Option<&AnalysisPayload> {
        self.entries.get(key)
    }

    /// Lookup by raw `classname` / `name` attribute values
    pub fn lookup(&self, group: &str, name: &str) -> Option<&AnalysisPayload> {
        self.entries.get(&ReportKey::new(group, name))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ReportKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ReportKey, AnalysisPayload)> for AnalysisIndex {
    fn from_iter<I: IntoIterator<Item = (ReportKey, AnalysisPayload)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
