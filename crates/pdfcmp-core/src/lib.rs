//! Document comparison orchestration for pdfcmp.
//!
//! [`CompareTool`] ties the pieces together: it loads both documents, walks
//! their page trees, runs the structural comparator page by page, writes the
//! optional structured report, and falls back to a visual comparison of the
//! pages that did not compare equal.
//!
//! # Key Types
//!
//! - [`CompareTool`] -- Entry point for content, visual and link comparison
//! - [`CompareConfig`] -- Limits, tolerance, report and tool settings (TOML)
//! - [`Verdict`] / [`Failure`] / [`FailureKind`] -- Outcome of a comparison
//! - [`CompareObserver`] -- Progress checkpoints (page start, page result, overall result)
//! - [`compare_links`] -- Link-annotation comparison
//! - [`compare_document_info`] -- Title, author, subject and keywords

pub mod config;
pub mod error;
pub mod info;
pub mod links;
pub mod observer;
pub mod tool;
pub mod verdict;

pub use config::CompareConfig;
pub use error::{CompareError, CompareResult};
pub use info::compare_document_info;
pub use links::compare_links;
pub use observer::{CompareObserver, SilentObserver, TracingObserver};
pub use tool::{ComparePaths, CompareTool, ContentComparison};
pub use verdict::{Failure, FailureKind, Verdict};
