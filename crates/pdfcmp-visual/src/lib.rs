//! Visual fallback for pdfcmp.
//!
//! Renders both documents to PNG pages with Ghostscript and compares the
//! page images byte for byte. When ImageMagick's `compare` is available, a
//! difference image is produced for every page that differs.
//!
//! # Key Types
//!
//! - [`VisualConfig`] -- Paths to the external tools and the rendering resolution
//! - [`VisualComparer`] -- Runs the rasterize-and-compare pass for one document pair
//! - [`VisualOutcome`] -- Identical, different (with a message), or a tool failure
//!
//! External tool problems never panic or return `Err`; they surface as
//! [`VisualOutcome::ToolFailure`] with a descriptive message.

pub mod comparer;
pub mod config;
mod images;
pub mod outcome;

pub use comparer::VisualComparer;
pub use config::VisualConfig;
pub use outcome::VisualOutcome;
