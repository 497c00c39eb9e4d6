//! Foundation types for pdfcmp.
//!
//! This crate provides the document object model every other pdfcmp crate
//! compares, walks, or decodes. It performs no I/O and no parsing of its own.
//!
//! # Key Types
//!
//! - [`ObjRef`] — Indirect-reference key (object number + generation)
//! - [`PdfObject`] — Closed set of node variants (dictionary, array, stream, leaves, reference)
//! - [`PdfDict`] — Name-keyed dictionary with sorted iteration
//! - [`PdfStream`] — Stream dictionary plus raw (still encoded) bytes
//! - [`PdfName`] / [`PdfString`] — Byte-exact names and strings
//! - [`ObjectKind`] — Variant tag used in kind-mismatch diagnostics

pub mod name;
pub mod object;
pub mod object_ref;
pub mod string;

pub use name::PdfName;
pub use object::{format_number, ObjectKind, PdfDict, PdfObject, PdfStream};
pub use object_ref::ObjRef;
pub use string::PdfString;
