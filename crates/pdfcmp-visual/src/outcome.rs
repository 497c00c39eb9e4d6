use std::fmt;
use std::path::PathBuf;

/// Result of a visual comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisualOutcome {
    /// Every compared page image is byte-identical and page counts agree.
    Identical,
    /// At least one page differs, or the page counts differ.
    Different {
        message: String,
        /// Difference images written by the compare tool, if any.
        diff_images: Vec<PathBuf>,
    },
    /// A tool was missing, failed, or produced nothing to compare.
    ToolFailure(String),
}

impl VisualOutcome {
    pub fn is_identical(&self) -> bool {
        matches!(self, VisualOutcome::Identical)
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            VisualOutcome::Identical => None,
            VisualOutcome::Different { message, .. } | VisualOutcome::ToolFailure(message) => Some(message),
        }
    }
}

impl fmt::Display for VisualOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => f.write_str(message),
            None => f.write_str("identical"),
        }
    }
}
