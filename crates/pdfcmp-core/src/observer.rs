use tracing::{debug, info, warn};

use crate::verdict::Verdict;

/// Progress checkpoints of a content comparison.
///
/// Page indices are zero-based.
pub trait CompareObserver: Send + Sync {
    fn page_started(&self, page: usize);
    fn page_finished(&self, page: usize, equal: bool);
    fn finished(&self, verdict: &Verdict);
}

/// Forwards checkpoints to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CompareObserver for TracingObserver {
    fn page_started(&self, page: usize) {
        debug!(page = page + 1, "comparing page");
    }

    fn page_finished(&self, page: usize, equal: bool) {
        debug!(page = page + 1, equal, "page compared");
    }

    fn finished(&self, verdict: &Verdict) {
        match verdict.kind() {
            None => info!("comparison OK"),
            Some(kind) => warn!(?kind, "comparison failed"),
        }
    }
}

/// Ignores every checkpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl CompareObserver for SilentObserver {
    fn page_started(&self, _page: usize) {}

    fn page_finished(&self, _page: usize, _equal: bool) {}

    fn finished(&self, _verdict: &Verdict) {}
}
