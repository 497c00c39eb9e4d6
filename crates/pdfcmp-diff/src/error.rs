//! Error types for the comparison engine.

use pdfcmp_types::ObjectKind;

/// Hard failures of a comparison. Ordinary divergences are never errors;
/// they are recorded in a [`DifferenceSet`](crate::DifferenceSet).
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Two resolved nodes reached a pairing no comparison rule covers.
    #[error("unsupported object pairing: reference {reference}, candidate {candidate}")]
    UnsupportedPairing {
        reference: ObjectKind,
        candidate: ObjectKind,
    },

    /// The structured report could not be written.
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The structured report could not be serialized.
    #[error("report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for comparison results.
pub type DiffResult<T> = Result<T, DiffError>;
