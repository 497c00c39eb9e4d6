//! Document model for pdfcmp.
//!
//! The comparators never touch a file. They read objects through the
//! [`Document`] trait, which this crate implements twice: once over a parsed
//! file and once over an in-memory object table that tests assemble by hand.
//!
//! # Contents
//!
//! - [`Document`] -- object lookup, reference resolution and catalog access
//! - [`InMemoryDocument`] -- `BTreeMap`-backed document for tests and embedding
//! - [`load_document`] / [`load_document_from_memory`] -- parse a file with `lopdf`
//! - [`PageSequence`] -- depth-first walk of the page tree
//! - [`decode_stream`] -- stream filter chain decoding
//! - [`ContentParser`] -- content-stream tokenizer with inline-image support

pub mod content;
pub mod decode;
pub mod error;
mod lexer;
pub mod loader;
pub mod memory;
pub mod pages;
pub mod traits;

pub use content::{content_bytes, ContentOp, ContentParser, InlineImage, ResourceScope};
pub use decode::{decode_stream, stream_filters};
pub use error::{DocError, DocResult};
pub use loader::{load_document, load_document_from_memory};
pub use memory::InMemoryDocument;
pub use pages::PageSequence;
pub use traits::Document;
