//! Bounded collection of recorded differences.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DiffResult;
use crate::path::ObjectPath;
use crate::report::ReportNode;

const ENTRY_SEPARATOR: &str = "-----------------------------";

/// A recorded divergence: where, and what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Difference {
    pub path: ObjectPath,
    pub message: String,
}

/// Diagnostics of one comparison, keyed by path.
///
/// At most `limit` entries are kept, and the first message recorded for a
/// path wins. An empty set means the comparison succeeded.
#[derive(Clone, Debug)]
pub struct DifferenceSet {
    limit: usize,
    entries: Vec<Difference>,
    seen: HashSet<ObjectPath>,
}

impl Default for DifferenceSet {
    fn default() -> Self {
        Self::new(1)
    }
}

impl DifferenceSet {
    /// Create a set holding at most `limit` differences (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record `message` at a snapshot of `path`.
    ///
    /// Ignored once the limit is reached or when `path` already has an entry.
    pub fn record(&mut self, path: &ObjectPath, message: impl Into<String>) {
        if self.is_saturated() || self.seen.contains(path) {
            return;
        }
        let message = message.into();
        debug!(path = %path, diagnostic = %message, "difference recorded");
        self.seen.insert(path.clone());
        self.entries.push(Difference {
            path: path.clone(),
            message,
        });
    }

    /// No differences were recorded.
    pub fn is_satisfied(&self) -> bool {
        self.entries.is_empty()
    }

    /// No further differences can be recorded.
    pub fn is_saturated(&self) -> bool {
        self.entries.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Difference> {
        self.entries.iter()
    }

    /// Plain-text report: each message followed by its path, entries
    /// separated by a rule.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(ENTRY_SEPARATOR);
                out.push('\n');
            }
            out.push_str(&entry.message);
            out.push('\n');
            out.push_str(&entry.path.to_string());
            out.push('\n');
        }
        out
    }

    /// `report` → `errors count=N` → `error` (`message`, `path`) tree.
    pub fn structured_report(&self) -> ReportNode {
        let mut errors = ReportNode::new("errors").with_attribute("count", self.entries.len().to_string());
        for entry in &self.entries {
            errors.push(
                ReportNode::new("error")
                    .with_child(ReportNode::new("message").with_text(entry.message.clone()))
                    .with_child(entry.path.to_report_node()),
            );
        }
        ReportNode::new("report").with_child(errors)
    }

    /// Write the structured report to `<dir>/<name>.xml` and return its path.
    pub fn write_xml_report(&self, dir: &Path, name: &str) -> DiffResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let target = dir.join(format!("{name}.xml"));
        fs::write(&target, self.structured_report().to_xml())?;
        Ok(target)
    }
}
