use std::fmt;

/// Why a comparison failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The documents have different page counts.
    PageCountMismatch,
    /// Structural differences confirmed by differing page images.
    VisualDifference,
    /// Structural differences with no visible effect on the rendered pages.
    NoVisualDifference,
    /// An external tool was missing or failed.
    ToolFailure,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of comparing a candidate document with its reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Equal,
    Different(Failure),
}

impl Verdict {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Verdict::Different(Failure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Verdict::Equal)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Equal => None,
            Verdict::Different(failure) => Some(&failure.message),
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Verdict::Equal => None,
            Verdict::Different(failure) => Some(failure.kind),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Equal => f.write_str("OK"),
            Verdict::Different(failure) => f.write_str(&failure.message),
        }
    }
}
