//! Structural comparison of two object graphs.
//!
//! Every rule takes the candidate first and the reference second, records
//! its own diagnostics, and returns whether the two sides are equal. Only an
//! object pairing no rule covers is an `Err`.

use std::collections::BTreeSet;

use pdfcmp_doc::{decode_stream, DocError, Document, PageSequence};
use pdfcmp_types::{format_number, ObjRef, PdfDict, PdfName, PdfObject, PdfStream, PdfString};
use tracing::warn;

use crate::differences::DifferenceSet;
use crate::error::{DiffError, DiffResult};
use crate::path::ObjectPath;
use crate::tolerance::FloatTolerance;

/// Bytes (or characters) shown on each side of a mismatch.
const CONTEXT_WINDOW: usize = 10;

/// Recursive equality engine over a candidate and a reference document.
pub struct Comparator<'a> {
    pub(crate) candidate: &'a dyn Document,
    pub(crate) reference: &'a dyn Document,
    candidate_pages: PageSequence<'a>,
    reference_pages: PageSequence<'a>,
    tolerance: FloatTolerance,
}

impl<'a> Comparator<'a> {
    /// Build a comparator, walking both page trees once.
    pub fn new(candidate: &'a dyn Document, reference: &'a dyn Document, tolerance: FloatTolerance) -> Self {
        Self {
            candidate_pages: PageSequence::from_document(candidate),
            reference_pages: PageSequence::from_document(reference),
            candidate,
            reference,
            tolerance,
        }
    }

    pub fn candidate_pages(&self) -> &PageSequence<'a> {
        &self.candidate_pages
    }

    pub fn reference_pages(&self) -> &PageSequence<'a> {
        &self.reference_pages
    }

    pub fn tolerance(&self) -> FloatTolerance {
        self.tolerance
    }

    /// Compare two nodes, either of which may be absent or indirect.
    pub fn compare_objects(
        &self,
        candidate: Option<&PdfObject>,
        reference: Option<&PdfObject>,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        let cand_direct = candidate.and_then(|obj| self.candidate.resolve(obj));
        let ref_direct = reference.and_then(|obj| self.reference.resolve(obj));
        let (cand_direct, ref_direct) = match (cand_direct, ref_direct) {
            (None, None) => return Ok(true),
            (None, Some(_)) => {
                diffs.record(path, "Expected object was not found.");
                return Ok(false);
            }
            (Some(_), None) => {
                diffs.record(path, "Found object which was not expected to be found.");
                return Ok(false);
            }
            (Some(c), Some(r)) if c.kind() != r.kind() => {
                diffs.record(
                    path,
                    format!("Types do not match. Expected: {}. Found: {}.", r.kind(), c.kind()),
                );
                return Ok(false);
            }
            (Some(c), Some(r)) => (c, r),
        };

        let cand_ref = candidate.and_then(PdfObject::as_reference);
        let ref_ref = reference.and_then(PdfObject::as_reference);
        let mut branch;
        let path = match (cand_ref, ref_ref) {
            (Some(c), Some(r)) => {
                if path.is_comparing(r, c) {
                    return Ok(true);
                }
                branch = path.reset_at(r, c);
                &mut branch
            }
            _ => path,
        };

        if let PdfObject::Dictionary(ref_dict) = ref_direct {
            if ref_dict.is_page() {
                return Ok(self.compare_page_identity(cand_direct, cand_ref, ref_ref, path, diffs));
            }
        }

        match (cand_direct, ref_direct) {
            (PdfObject::Dictionary(c), PdfObject::Dictionary(r)) => self.compare_dictionaries(c, r, path, diffs),
            (PdfObject::Stream(c), PdfObject::Stream(r)) => self.compare_streams(c, r, path, diffs),
            (PdfObject::Array(c), PdfObject::Array(r)) => self.compare_arrays(c, r, path, diffs),
            (PdfObject::Name(c), PdfObject::Name(r)) => Ok(compare_names(c, r, path, diffs)),
            (PdfObject::Number(c), PdfObject::Number(r)) => Ok(self.compare_numbers(*c, *r, path, diffs)),
            (PdfObject::String(c), PdfObject::String(r)) => Ok(compare_strings(c, r, path, diffs)),
            (PdfObject::Boolean(c), PdfObject::Boolean(r)) => {
                if c == r {
                    return Ok(true);
                }
                diffs.record(path, format!("Boolean. Expected: {r}. Found: {c}."));
                Ok(false)
            }
            (PdfObject::Literal(c), PdfObject::Literal(r)) => {
                if c == r {
                    return Ok(true);
                }
                diffs.record(
                    path,
                    format!(
                        "Literal. Expected: {}. Found: {}",
                        String::from_utf8_lossy(r),
                        String::from_utf8_lossy(c)
                    ),
                );
                Ok(false)
            }
            (c, r) => Err(DiffError::UnsupportedPairing {
                reference: r.kind(),
                candidate: c.kind(),
            }),
        }
    }

    /// Convenience check with a throwaway path and difference set.
    pub fn objects_equal(&self, candidate: &PdfObject, reference: &PdfObject) -> DiffResult<bool> {
        let mut path = ObjectPath::default();
        let mut diffs = DifferenceSet::new(1);
        self.compare_objects(Some(candidate), Some(reference), &mut path, &mut diffs)
    }

    /// A page is equal to another page exactly when both hold the same
    /// position in their page sequences.
    fn compare_page_identity(
        &self,
        candidate: &PdfObject,
        cand_ref: Option<ObjRef>,
        ref_ref: Option<ObjRef>,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> bool {
        if !matches!(candidate, PdfObject::Dictionary(d) if d.is_page()) {
            diffs.record(path, "Expected a page. Found not a page.");
            return false;
        }
        let ref_index = ref_ref.and_then(|id| self.reference_pages.index_of(id));
        let cand_index = cand_ref.and_then(|id| self.candidate_pages.index_of(id));
        if ref_index.is_some() && ref_index == cand_index {
            return true;
        }
        diffs.record(
            path,
            format!(
                "The dictionaries refer to different pages. Expected page index: {}. Found: {}",
                index_label(ref_index),
                index_label(cand_index)
            ),
        );
        false
    }

    /// Compare two dictionaries over the union of their keys.
    pub fn compare_dictionaries(
        &self,
        candidate: &PdfDict,
        reference: &PdfDict,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        self.compare_dict_entries(candidate, reference, false, path, diffs)
    }

    fn compare_dict_entries(
        &self,
        candidate: &PdfDict,
        reference: &PdfDict,
        both_streams: bool,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        let keys: BTreeSet<&PdfName> = reference.keys().chain(candidate.keys()).collect();
        let mut same = true;
        for key in keys {
            if key.is("Parent") || key.is("P") {
                continue;
            }
            if both_streams && (key.is("Filter") || key.is("Length")) {
                continue;
            }

            path.push_dict_key(key);
            let entry_equal = if key.is("BaseFont") || key.is("FontName") {
                match self.compare_subset_font_name(key, candidate, reference, path, diffs) {
                    Some(equal) => equal,
                    None => self.compare_objects(candidate.get(key), reference.get(key), path, diffs)?,
                }
            } else if key.is("Contents") && !self.tolerance.is_exact() && candidate.is_page() && reference.is_page() {
                let cand_resources = candidate.get("Resources").and_then(|r| self.candidate.resolve_dict(r));
                let ref_resources = reference.get("Resources").and_then(|r| self.reference.resolve_dict(r));
                self.compare_content_streams(
                    candidate.get(key),
                    reference.get(key),
                    cand_resources,
                    ref_resources,
                    path,
                    diffs,
                )?
            } else {
                self.compare_objects(candidate.get(key), reference.get(key), path, diffs)?
            };
            path.pop();

            same = entry_equal && same;
            if !same && diffs.is_saturated() {
                return Ok(false);
            }
        }
        Ok(same)
    }

    /// Subset-tagged font names compare on the part after the tag.
    ///
    /// Returns `None` when the reference value carries no subset tag, leaving
    /// the entry to the ordinary rules.
    fn compare_subset_font_name(
        &self,
        key: &PdfName,
        candidate: &PdfDict,
        reference: &PdfDict,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> Option<bool> {
        let ref_value = reference.get(key).and_then(|v| self.reference.resolve(v));
        let ref_name = ref_value?.as_name()?.as_bytes();
        let ref_suffix = subset_suffix(ref_name)?;

        let cand_value = candidate.get(key).and_then(|v| self.candidate.resolve(v));
        let cand_suffix = cand_value
            .and_then(PdfObject::as_name)
            .and_then(|name| subset_suffix(name.as_bytes()));
        if cand_suffix == Some(ref_suffix) {
            return Some(true);
        }
        diffs.record(
            path,
            format!(
                "Dictionary {key} entry: Expected: {}. Found: {}",
                describe(ref_value),
                describe(cand_value)
            ),
        );
        Some(false)
    }

    fn compare_streams(
        &self,
        candidate: &PdfStream,
        reference: &PdfStream,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        if !self.tolerance.is_exact() && candidate.is_form_xobject() && reference.is_form_xobject() {
            let cand_resources = candidate.dict.get("Resources").and_then(|r| self.candidate.resolve_dict(r));
            let ref_resources = reference.dict.get("Resources").and_then(|r| self.reference.resolve_dict(r));
            let content_equal = self.compare_content_bytes(
                &stream_bytes(candidate),
                &stream_bytes(reference),
                cand_resources,
                ref_resources,
                path,
                diffs,
            )?;
            return Ok(content_equal && self.compare_dict_entries(&candidate.dict, &reference.dict, true, path, diffs)?);
        }

        let (cand_bytes, ref_bytes) = match (decode_stream(candidate), decode_stream(reference)) {
            (Ok(c), Ok(r)) => (c, r),
            (c, r) => {
                for err in [c.err(), r.err()].into_iter().flatten() {
                    log_decode_failure(&err);
                }
                (candidate.data.clone(), reference.data.clone())
            }
        };

        if cand_bytes == ref_bytes {
            return self.compare_dict_entries(&candidate.dict, &reference.dict, true, path, diffs);
        }
        if cand_bytes.len() != ref_bytes.len() {
            diffs.record(
                path,
                format!(
                    "Stream lengths are different. Expected: {}. Found: {}",
                    ref_bytes.len(),
                    cand_bytes.len()
                ),
            );
            return Ok(false);
        }
        if let Some(i) = cand_bytes.iter().zip(&ref_bytes).position(|(c, r)| c != r) {
            let lo = i.saturating_sub(CONTEXT_WINDOW);
            let hi = (i + CONTEXT_WINDOW).min(ref_bytes.len());
            path.push_offset(i);
            diffs.record(
                path,
                format!(
                    "Stream bytes differ at index {i}. Expected: {} ({}). Found: {} ({})",
                    byte_text(&ref_bytes[i..=i]),
                    byte_text(&ref_bytes[lo..hi]),
                    byte_text(&cand_bytes[i..=i]),
                    byte_text(&cand_bytes[lo..hi]),
                ),
            );
            path.pop();
        }
        Ok(false)
    }

    fn compare_arrays(
        &self,
        candidate: &[PdfObject],
        reference: &[PdfObject],
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        if candidate.len() != reference.len() {
            diffs.record(
                path,
                format!(
                    "Array lengths are different. Expected: {}. Found: {}.",
                    reference.len(),
                    candidate.len()
                ),
            );
            return Ok(false);
        }
        let mut same = true;
        for (i, (c, r)) in candidate.iter().zip(reference).enumerate() {
            path.push_array_index(i);
            let item_equal = self.compare_objects(Some(c), Some(r), path, diffs)?;
            path.pop();
            same = item_equal && same;
            if !same && diffs.is_saturated() {
                return Ok(false);
            }
        }
        Ok(same)
    }

    fn compare_numbers(&self, candidate: f64, reference: f64, path: &ObjectPath, diffs: &mut DifferenceSet) -> bool {
        if self.tolerance.accepts(candidate, reference) {
            return true;
        }
        diffs.record(
            path,
            format!(
                "Number. Expected: {}. Found: {}",
                format_number(reference),
                format_number(candidate)
            ),
        );
        false
    }
}

fn compare_names(candidate: &PdfName, reference: &PdfName, path: &ObjectPath, diffs: &mut DifferenceSet) -> bool {
    if candidate == reference {
        return true;
    }
    diffs.record(path, format!("Name. Expected: {reference}. Found: {candidate}"));
    false
}

fn compare_strings(candidate: &PdfString, reference: &PdfString, path: &mut ObjectPath, diffs: &mut DifferenceSet) -> bool {
    if candidate == reference {
        return true;
    }
    let cand_text: Vec<char> = candidate.to_text().chars().collect();
    let ref_text: Vec<char> = reference.to_text().chars().collect();
    if cand_text.len() != ref_text.len() {
        diffs.record(
            path,
            format!(
                "String lengths are different. Expected: {}. Found: {}",
                ref_text.len(),
                cand_text.len()
            ),
        );
        return false;
    }
    match cand_text.iter().zip(&ref_text).position(|(c, r)| c != r) {
        Some(i) => {
            let lo = i.saturating_sub(CONTEXT_WINDOW);
            let hi = (i + CONTEXT_WINDOW).min(ref_text.len());
            path.push_offset(i);
            diffs.record(
                path,
                format!(
                    "String characters differ at position {i}. Expected: {} ({}). Found: {} ({}).",
                    ref_text[i],
                    char_window(&ref_text[lo..hi]),
                    cand_text[i],
                    char_window(&cand_text[lo..hi]),
                ),
            );
            path.pop();
        }
        None => diffs.record(
            path,
            format!(
                "String bytes differ but decode to the same text. Expected: {reference}. Found: {candidate}"
            ),
        ),
    }
    false
}

/// The font name following a six-letter subset tag such as `ABCDEF+`.
fn subset_suffix(name: &[u8]) -> Option<&[u8]> {
    let (tag, rest) = name.split_at_checked(6)?;
    let suffix = rest.strip_prefix(b"+")?;
    (tag.iter().all(u8::is_ascii_uppercase) && !suffix.is_empty()).then_some(suffix)
}

/// Decoded stream bytes, or the stored bytes when decoding is impossible.
pub(crate) fn stream_bytes(stream: &PdfStream) -> Vec<u8> {
    decode_stream(stream).unwrap_or_else(|err| {
        log_decode_failure(&err);
        stream.data.clone()
    })
}

fn log_decode_failure(err: &DocError) {
    match err {
        DocError::UnsupportedFilter(filter) => warn!(%filter, "unsupported filter, comparing raw stream bytes"),
        other => warn!(error = %other, "stream decoding failed, comparing raw bytes"),
    }
}

fn byte_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\n', "\\n")
}

fn char_window(chars: &[char]) -> String {
    chars.iter().collect::<String>().replace('\n', "\\n")
}

fn index_label(index: Option<usize>) -> String {
    index.map_or_else(|| "none".to_string(), |i| i.to_string())
}

fn describe(value: Option<&PdfObject>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;
    use pdfcmp_doc::InMemoryDocument;
    use proptest::prelude::*;

    fn name(n: &str) -> PdfObject {
        PdfObject::name(n)
    }

    fn compare(cand: &InMemoryDocument, reference: &InMemoryDocument, c: &PdfObject, r: &PdfObject, limit: usize) -> (bool, DifferenceSet) {
        compare_with(cand, reference, c, r, limit, FloatTolerance::exact())
    }

    fn compare_with(
        cand: &InMemoryDocument,
        reference: &InMemoryDocument,
        c: &PdfObject,
        r: &PdfObject,
        limit: usize,
        tolerance: FloatTolerance,
    ) -> (bool, DifferenceSet) {
        let comparator = Comparator::new(cand, reference, tolerance);
        let mut diffs = DifferenceSet::new(limit);
        let mut path = ObjectPath::default();
        let equal = comparator.compare_objects(Some(c), Some(r), &mut path, &mut diffs).unwrap();
        (equal, diffs)
    }

    fn messages(diffs: &DifferenceSet) -> Vec<String> {
        diffs.iter().map(|d| d.message.clone()).collect()
    }

    /// A two-page document whose pages point back at their parent and whose
    /// annotations point back at their page.
    fn sample_document(rotate: i64) -> InMemoryDocument {
        let mut doc = InMemoryDocument::new();
        let font = doc.add(
            PdfDict::new()
                .with("Type", name("Font"))
                .with("Subtype", name("Type1"))
                .with("BaseFont", name("Helvetica")),
        );
        let resources = PdfDict::new().with("Font", PdfDict::new().with("F1", font));
        let content = doc.add(PdfStream::new(PdfDict::new(), b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET".to_vec()));
        let first = doc.push_page(
            PdfDict::new()
                .with("Resources", resources.clone())
                .with("Contents", content)
                .with("Rotate", rotate),
        );
        let second = doc.push_page(PdfDict::new().with("Resources", resources));
        let annot = doc.add(
            PdfDict::new()
                .with("Type", name("Annot"))
                .with("Subtype", name("Link"))
                .with("P", first)
                .with("Dest", PdfObject::Array(vec![second.into(), name("Fit")])),
        );
        if let Some(PdfObject::Dictionary(page)) = doc.get_mut(first) {
            page.insert("Annots", PdfObject::Array(vec![annot.into()]));
        }
        doc
    }

    fn first_page(doc: &InMemoryDocument) -> PdfObject {
        PdfObject::Reference(PageSequence::from_document(doc).get(0).unwrap().1)
    }

    #[test]
    fn identical_documents_compare_equal() {
        let a = sample_document(0);
        let b = sample_document(0);
        let comparator = Comparator::new(&a, &b, FloatTolerance::exact());
        for i in 0..2 {
            let (cand_page, cand_ref) = comparator.candidate_pages().get(i).unwrap();
            let (ref_page, ref_ref) = comparator.reference_pages().get(i).unwrap();
            let mut path = ObjectPath::new(Some(ref_ref), Some(cand_ref));
            let mut diffs = DifferenceSet::new(10);
            assert!(comparator.compare_dictionaries(cand_page, ref_page, &mut path, &mut diffs).unwrap());
            assert!(diffs.is_satisfied());
        }
    }

    #[test]
    fn page_difference_is_located() {
        let cand = sample_document(90);
        let reference = sample_document(0);
        let comparator = Comparator::new(&cand, &reference, FloatTolerance::exact());
        let (cand_page, cand_ref) = comparator.candidate_pages().get(0).unwrap();
        let (ref_page, ref_ref) = comparator.reference_pages().get(0).unwrap();
        let mut path = ObjectPath::new(Some(ref_ref), Some(cand_ref));
        let mut diffs = DifferenceSet::new(10);
        assert!(!comparator.compare_dictionaries(cand_page, ref_page, &mut path, &mut diffs).unwrap());
        let entry = diffs.iter().next().unwrap();
        assert_eq!(entry.message, "Number. Expected: 0. Found: 90");
        assert_eq!(entry.path.segments(), &[PathSegment::DictKey("/Rotate".into())]);
        assert!(path.segments().is_empty());
    }

    #[test]
    fn union_of_keys_reports_missing_and_unexpected() {
        let doc = InMemoryDocument::new();
        let cand = PdfObject::from(PdfDict::new().with("B", 2i64));
        let reference = PdfObject::from(PdfDict::new().with("A", 1i64));
        let (equal, diffs) = compare(&doc, &doc, &cand, &reference, 10);
        assert!(!equal);
        assert_eq!(
            messages(&diffs),
            ["Expected object was not found.", "Found object which was not expected to be found."]
        );
        let keys: Vec<&[PathSegment]> = diffs.iter().map(|d| d.path.segments()).collect();
        assert_eq!(keys[0], &[PathSegment::DictKey("/A".into())]);
        assert_eq!(keys[1], &[PathSegment::DictKey("/B".into())]);
    }

    #[test]
    fn limit_caps_recorded_differences() {
        let doc = InMemoryDocument::new();
        let mut cand = PdfDict::new();
        let mut reference = PdfDict::new();
        for i in 0..10i64 {
            cand.insert(format!("K{i}"), i + 100);
            reference.insert(format!("K{i}"), i);
        }
        let (equal, diffs) = compare(&doc, &doc, &cand.into(), &reference.into(), 3);
        assert!(!equal);
        assert_eq!(diffs.len(), 3);
        assert!(!diffs.is_satisfied());
        assert_eq!(diffs.report().matches("Number. Expected").count(), 3);
    }

    #[test]
    fn kind_mismatch_is_recorded() {
        let doc = InMemoryDocument::new();
        let (equal, diffs) = compare(&doc, &doc, &name("X"), &PdfObject::Number(1.0), 1);
        assert!(!equal);
        assert_eq!(messages(&diffs), ["Types do not match. Expected: number. Found: name."]);
    }

    #[test]
    fn nulls_and_dangling_refs_are_absent() {
        let doc = InMemoryDocument::new();
        let dangling = PdfObject::Reference(ObjRef::new(77, 0));
        let (equal, diffs) = compare(&doc, &doc, &PdfObject::Null, &dangling, 1);
        assert!(equal);
        assert!(diffs.is_satisfied());
    }

    #[test]
    fn back_links_are_skipped() {
        let doc = InMemoryDocument::new();
        let cand = PdfObject::from(PdfDict::new().with("Parent", 1i64).with("P", 2i64));
        let reference = PdfObject::from(PdfDict::new().with("Parent", 3i64));
        assert!(compare(&doc, &doc, &cand, &reference, 1).0);
    }

    #[test]
    fn subset_tag_is_ignored() {
        let doc = InMemoryDocument::new();
        let reference = PdfObject::from(PdfDict::new().with("BaseFont", name("ABCDEF+Helvetica")));
        let same = PdfObject::from(PdfDict::new().with("BaseFont", name("XYZABC+Helvetica")));
        let untagged = PdfObject::from(PdfDict::new().with("BaseFont", name("Helvetica")));
        let other = PdfObject::from(PdfDict::new().with("FontName", name("XYZABC+Times")));
        assert!(compare(&doc, &doc, &same, &reference, 1).0);

        let (equal, diffs) = compare(&doc, &doc, &untagged, &reference, 1);
        assert!(!equal);
        assert_eq!(
            messages(&diffs),
            ["Dictionary /BaseFont entry: Expected: /ABCDEF+Helvetica. Found: /Helvetica"]
        );

        let reference = PdfObject::from(PdfDict::new().with("FontName", name("ABCDEF+Helvetica")));
        assert!(!compare(&doc, &doc, &other, &reference, 1).0);
    }

    #[test]
    fn only_six_letter_tags_are_subset_tags() {
        let doc = InMemoryDocument::new();
        let font = |n: &str| PdfObject::from(PdfDict::new().with("BaseFont", name(n)));
        assert!(!compare(&doc, &doc, &font("B+Serif"), &font("A+Serif"), 1).0);
        assert!(compare(&doc, &doc, &font("A+Serif"), &font("A+Serif"), 1).0);
        assert!(!compare(&doc, &doc, &font("XYZABC+Serif"), &font("abcdef+Serif"), 1).0);
        assert!(compare(&doc, &doc, &font("QRSTUV+Serif"), &font("ABCDEF+Serif"), 1).0);
    }

    #[test]
    fn untagged_reference_font_compares_exactly() {
        let doc = InMemoryDocument::new();
        let reference = PdfObject::from(PdfDict::new().with("BaseFont", name("Helvetica")));
        let cand = PdfObject::from(PdfDict::new().with("BaseFont", name("XYZABC+Helvetica")));
        assert!(!compare(&doc, &doc, &cand, &reference, 1).0);
    }

    #[test]
    fn numeric_tolerance_applies_to_numbers() {
        let doc = InMemoryDocument::new();
        let abs = FloatTolerance::absolute(0.01);
        let num = PdfObject::Number;
        assert!(compare_with(&doc, &doc, &num(1.004), &num(1.0), 1, abs).0);
        assert!(!compare_with(&doc, &doc, &num(1.02), &num(1.0), 1, abs).0);
        let rel = FloatTolerance::relative(0.01);
        assert!(compare_with(&doc, &doc, &num(101.0), &num(100.0), 1, rel).0);
        assert!(!compare_with(&doc, &doc, &num(103.0), &num(100.0), 1, rel).0);
    }

    #[test]
    fn array_length_mismatch() {
        let doc = InMemoryDocument::new();
        let cand = PdfObject::Array(vec![1i64.into()]);
        let reference = PdfObject::Array(vec![1i64.into(), 2i64.into()]);
        let (equal, diffs) = compare(&doc, &doc, &cand, &reference, 1);
        assert!(!equal);
        assert_eq!(messages(&diffs), ["Array lengths are different. Expected: 2. Found: 1."]);
    }

    #[test]
    fn array_element_difference_has_index_segment() {
        let doc = InMemoryDocument::new();
        let cand = PdfObject::Array(vec![0i64.into(), 0i64.into(), 612i64.into(), 800i64.into()]);
        let reference = PdfObject::Array(vec![0i64.into(), 0i64.into(), 612i64.into(), 792i64.into()]);
        let (_, diffs) = compare(&doc, &doc, &cand, &reference, 1);
        assert_eq!(diffs.iter().next().unwrap().path.segments(), &[PathSegment::ArrayIndex(3)]);
    }

    #[test]
    fn string_difference_reports_first_character() {
        let doc = InMemoryDocument::new();
        let cand = PdfObject::String(PdfString::literal(b"Hello world".to_vec()));
        let reference = PdfObject::String(PdfString::literal(b"Hello World".to_vec()));
        let (equal, diffs) = compare(&doc, &doc, &cand, &reference, 1);
        assert!(!equal);
        let entry = diffs.iter().next().unwrap();
        assert!(entry.message.starts_with("String characters differ at position 6. Expected: W"));
        assert_eq!(entry.path.segments(), &[PathSegment::Offset(6)]);
    }

    #[test]
    fn string_encoding_only_difference_still_fails() {
        let doc = InMemoryDocument::new();
        let cand = PdfObject::String(PdfString::hex(vec![0xfe, 0xff, 0x00, b'A']));
        let reference = PdfObject::String(PdfString::literal(b"A".to_vec()));
        let (equal, diffs) = compare(&doc, &doc, &cand, &reference, 1);
        assert!(!equal);
        assert!(!diffs.is_satisfied());
    }

    #[test]
    fn booleans_and_literals() {
        let doc = InMemoryDocument::new();
        let (equal, diffs) = compare(&doc, &doc, &PdfObject::Boolean(true), &PdfObject::Boolean(false), 1);
        assert!(!equal);
        assert_eq!(messages(&diffs), ["Boolean. Expected: false. Found: true."]);
        let (equal, _) = compare(&doc, &doc, &PdfObject::Literal(b"Tj".to_vec()), &PdfObject::Literal(b"Tj".to_vec()), 1);
        assert!(equal);
    }

    #[test]
    fn streams_compare_decoded_payload_and_ignore_filter() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"0 0 m 1 1 l S").unwrap();
        let compressed = enc.finish().unwrap();
        let doc = InMemoryDocument::new();
        let cand = PdfStream::new(
            PdfDict::new().with("Filter", name("FlateDecode")).with("Length", compressed.len() as i64),
            compressed,
        );
        let reference = PdfStream::new(PdfDict::new().with("Length", 13i64), b"0 0 m 1 1 l S".to_vec());
        assert!(compare(&doc, &doc, &cand.into(), &reference.into(), 1).0);
    }

    #[test]
    fn stream_byte_difference_reports_offset_and_context() {
        let doc = InMemoryDocument::new();
        let cand = PdfStream::new(PdfDict::new(), b"q\n1 0 0 1 0 0 cm\nQ".to_vec());
        let reference = PdfStream::new(PdfDict::new(), b"q\n2 0 0 1 0 0 cm\nQ".to_vec());
        let (equal, diffs) = compare(&doc, &doc, &cand.into(), &reference.into(), 5);
        assert!(!equal);
        assert_eq!(diffs.len(), 1);
        let entry = diffs.iter().next().unwrap();
        assert_eq!(entry.path.segments(), &[PathSegment::Offset(2)]);
        assert_eq!(
            entry.message,
            "Stream bytes differ at index 2. Expected: 2 (q\\n2 0 0 1 0 ). Found: 1 (q\\n1 0 0 1 0 )"
        );
    }

    #[test]
    fn stream_length_difference() {
        let doc = InMemoryDocument::new();
        let cand = PdfStream::new(PdfDict::new(), b"abc".to_vec());
        let reference = PdfStream::new(PdfDict::new(), b"abcd".to_vec());
        let (_, diffs) = compare(&doc, &doc, &cand.into(), &reference.into(), 1);
        assert_eq!(messages(&diffs), ["Stream lengths are different. Expected: 4. Found: 3"]);
    }

    #[test]
    fn references_to_same_page_index_are_equal() {
        let a = sample_document(0);
        let b = sample_document(0);
        let (equal, diffs) = compare(&a, &b, &first_page(&a), &first_page(&b), 1);
        assert!(equal);
        assert!(diffs.is_satisfied());
    }

    #[test]
    fn references_to_different_pages_are_reported() {
        let a = sample_document(0);
        let b = sample_document(0);
        let second = PdfObject::Reference(PageSequence::from_document(&a).get(1).unwrap().1);
        let (equal, diffs) = compare(&a, &b, &second, &first_page(&b), 1);
        assert!(!equal);
        assert_eq!(
            messages(&diffs),
            ["The dictionaries refer to different pages. Expected page index: 0. Found: 1"]
        );
    }

    #[test]
    fn page_against_non_page() {
        let a = sample_document(0);
        let b = sample_document(0);
        let font = PdfObject::Reference(ObjRef::new(1, 0));
        let (equal, diffs) = compare(&a, &b, &font, &first_page(&b), 1);
        assert!(!equal);
        assert_eq!(messages(&diffs), ["Expected a page. Found not a page."]);
    }

    #[test]
    fn cyclic_graph_terminates() {
        fn ring() -> (InMemoryDocument, ObjRef) {
            let mut doc = InMemoryDocument::new();
            let a = doc.reserve();
            let b = doc.reserve();
            doc.insert(a, PdfDict::new().with("Next", b).with("Value", 1i64));
            doc.insert(b, PdfDict::new().with("Next", a).with("Value", 2i64));
            (doc, a)
        }
        let (cand, ca) = ring();
        let (reference, ra) = ring();
        let (equal, diffs) = compare(&cand, &reference, &ca.into(), &ra.into(), 1);
        assert!(equal);
        assert!(diffs.is_satisfied());
    }

    #[test]
    fn difference_behind_reference_is_rooted_there() {
        let mut cand = InMemoryDocument::new();
        let mut reference = InMemoryDocument::new();
        let c_inner = cand.add(PdfDict::new().with("W", 5i64));
        let r_inner = reference.add(PdfDict::new().with("W", 6i64));
        let c_outer = PdfObject::from(PdfDict::new().with("Inner", c_inner));
        let r_outer = PdfObject::from(PdfDict::new().with("Inner", r_inner));
        let (_, diffs) = compare(&cand, &reference, &c_outer, &r_outer, 1);
        let entry = diffs.iter().next().unwrap();
        assert_eq!(entry.path.reference_root(), Some(r_inner));
        assert_eq!(entry.path.candidate_root(), Some(c_inner));
        assert_eq!(entry.path.segments(), &[PathSegment::DictKey("/W".into())]);
    }

    #[test]
    fn objects_equal_shortcut() {
        let doc = InMemoryDocument::new();
        let comparator = Comparator::new(&doc, &doc, FloatTolerance::exact());
        assert!(comparator.objects_equal(&name("A"), &name("A")).unwrap());
        assert!(!comparator.objects_equal(&name("A"), &name("B")).unwrap());
    }

    fn leaf() -> impl Strategy<Value = PdfObject> {
        prop_oneof![
            Just(PdfObject::Null),
            any::<bool>().prop_map(PdfObject::Boolean),
            (-1.0e6f64..1.0e6).prop_map(PdfObject::Number),
            "[A-Za-z]{1,8}".prop_map(|s| PdfObject::name(&s)),
            proptest::collection::vec(any::<u8>(), 0..16).prop_map(|b| PdfObject::String(PdfString::literal(b))),
        ]
    }

    fn tree() -> impl Strategy<Value = PdfObject> {
        leaf().prop_recursive(4, 64, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(PdfObject::Array),
                proptest::collection::btree_map("[A-Z][a-z]{0,5}", inner, 0..6).prop_map(|m| {
                    PdfObject::Dictionary(m.into_iter().map(|(k, v)| (PdfName::from(k), v)).collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn comparison_is_reflexive(obj in tree()) {
            let doc = InMemoryDocument::new();
            let (equal, diffs) = compare(&doc, &doc, &obj, &obj.clone(), 5);
            prop_assert!(equal);
            prop_assert!(diffs.is_satisfied());
        }
    }
}
