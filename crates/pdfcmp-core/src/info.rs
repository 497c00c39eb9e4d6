//! Document information dictionary comparison.
//!
//! Only the descriptive entries a reader sees are compared; producer,
//! creation and modification dates legitimately differ between runs.

use pdfcmp_doc::Document;
use pdfcmp_types::{PdfDict, PdfObject};

/// Entries compared, matched case-insensitively.
const COMPARED_ENTRIES: [&str; 4] = ["Title", "Author", "Subject", "Keywords"];

/// Failure message for any mismatching entry.
pub const DOCUMENT_INFO_FAIL: &str = "Document info fail";

/// Text of each compared entry, in [`COMPARED_ENTRIES`] order. Missing or
/// non-string entries read as empty.
fn info_fields(doc: &dyn Document) -> [String; 4] {
    let mut fields: [String; 4] = Default::default();
    let Some(info) = doc.info() else {
        return fields;
    };
    for (slot, name) in fields.iter_mut().zip(COMPARED_ENTRIES) {
        if let Some(text) = entry_text(doc, info, name) {
            *slot = text;
        }
    }
    fields
}

fn entry_text(doc: &dyn Document, info: &PdfDict, name: &str) -> Option<String> {
    let (_, value) = info
        .iter()
        .find(|(key, _)| key.as_bytes().eq_ignore_ascii_case(name.as_bytes()))?;
    match doc.resolve(value)? {
        PdfObject::String(s) => Some(s.to_text()),
        _ => None,
    }
}

/// Compare the title, author, subject and keywords of two documents.
///
/// Returns `None` when they all match, otherwise [`DOCUMENT_INFO_FAIL`].
pub fn compare_document_info(out_doc: &dyn Document, cmp_doc: &dyn Document) -> Option<String> {
    let out = info_fields(out_doc);
    let cmp = info_fields(cmp_doc);
    if out == cmp {
        None
    } else {
        Some(DOCUMENT_INFO_FAIL.to_string())
    }
}
