//! Comparison engine for pdfcmp.
//!
//! Decides whether a candidate document is equivalent to a reference
//! document, recording every divergence it finds against the exact route
//! through the object graph that led to it.
//!
//! # Key Types
//!
//! - [`Comparator`] -- Recursive structural comparison over two documents
//! - [`ObjectPath`] / [`PathSegment`] -- Location of a difference, with the cycle guard
//! - [`DifferenceSet`] -- Bounded, first-wins collection of diagnostics
//! - [`ReportNode`] -- Structured (XML/JSON) report tree
//! - [`FloatTolerance`] -- Absolute or relative numeric tolerance
//!
//! # Comparison Rules
//!
//! 1. Both sides are resolved through indirect references before comparison.
//! 2. A reference pair already being compared on the current stack is equal.
//! 3. Pages reached through a reference compare by their position in the page tree.
//! 4. Dictionaries compare over the union of their keys, skipping back-links.
//! 5. Streams compare decoded bytes; with a tolerance, form content compares by instruction.
//! 6. Font subset tags (`ABCDEF+`) never take part in the comparison.

pub mod compare;
pub mod content;
pub mod differences;
pub mod error;
pub mod path;
pub mod report;
pub mod tolerance;

pub use compare::Comparator;
pub use differences::{Difference, DifferenceSet};
pub use error::{DiffError, DiffResult};
pub use path::{ObjectPath, PathSegment};
pub use report::ReportNode;
pub use tolerance::{FloatTolerance, ToleranceMode};
