//! Instruction-level comparison of content streams.
//!
//! Used instead of byte comparison when a numeric tolerance is set, so that
//! operands which differ within the tolerance do not fail the page.

use pdfcmp_doc::{content_bytes, ContentOp, ContentParser, DocResult, Document, ResourceScope};
use pdfcmp_types::{PdfDict, PdfObject};

use crate::compare::Comparator;
use crate::differences::DifferenceSet;
use crate::error::DiffResult;
use crate::path::ObjectPath;

impl<'a> Comparator<'a> {
    /// Compare two `/Contents` values (a stream or an array of streams).
    ///
    /// `candidate_resources` and `reference_resources` are the page-level
    /// resources, used to size inline images with named colour spaces. When
    /// both content streams carry their own `/Resources`, those replace the
    /// page-level ones on both sides.
    pub fn compare_content_streams(
        &self,
        candidate: Option<&PdfObject>,
        reference: Option<&PdfObject>,
        candidate_resources: Option<&PdfDict>,
        reference_resources: Option<&PdfDict>,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        let cand_bytes = match read_contents(self.candidate, candidate) {
            Ok(bytes) => bytes,
            Err(reason) => {
                diffs.record(path, format!("Content stream cannot be read: {reason}"));
                return Ok(false);
            }
        };
        let ref_bytes = match read_contents(self.reference, reference) {
            Ok(bytes) => bytes,
            Err(reason) => {
                diffs.record(path, format!("Content stream cannot be read: {reason}"));
                return Ok(false);
            }
        };

        let (cand_resources, ref_resources) = match (
            own_resources(self.candidate, candidate),
            own_resources(self.reference, reference),
        ) {
            (Some(c), Some(r)) => (Some(c), Some(r)),
            _ => (candidate_resources, reference_resources),
        };
        self.compare_content_bytes(&cand_bytes, &ref_bytes, cand_resources, ref_resources, path, diffs)
    }

    /// Compare two decoded content streams instruction by instruction.
    pub fn compare_content_bytes(
        &self,
        candidate: &[u8],
        reference: &[u8],
        candidate_resources: Option<&PdfDict>,
        reference_resources: Option<&PdfDict>,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        let cand_scope = ResourceScope::new(self.candidate, candidate_resources);
        let ref_scope = ResourceScope::new(self.reference, reference_resources);
        let mut cand_parser = ContentParser::new(candidate);
        let mut ref_parser = ContentParser::new(reference);

        loop {
            let ref_op = match ref_parser.next_op(Some(&ref_scope)) {
                Ok(op) => op,
                Err(err) => {
                    diffs.record(path, format!("Content stream cannot be read: {err}"));
                    return Ok(false);
                }
            };
            let cand_op = match cand_parser.next_op(Some(&cand_scope)) {
                Ok(op) => op,
                Err(err) => {
                    diffs.record(path, format!("Content stream cannot be read: {err}"));
                    return Ok(false);
                }
            };

            let (cand_op, ref_op) = match (cand_op, ref_op) {
                (None, None) => return Ok(true),
                (Some(c), Some(r)) if c.token_count() == r.token_count() => (c, r),
                (c, r) => {
                    diffs.record(
                        path,
                        format!(
                            "Different command lengths. Expected: {}. Found: {}",
                            r.map_or(0, |op| op.token_count()),
                            c.map_or(0, |op| op.token_count())
                        ),
                    );
                    return Ok(false);
                }
            };

            if !self.compare_ops(&cand_op, &ref_op, path, diffs)? {
                return Ok(false);
            }
        }
    }

    fn compare_ops(
        &self,
        candidate: &ContentOp,
        reference: &ContentOp,
        path: &mut ObjectPath,
        diffs: &mut DifferenceSet,
    ) -> DiffResult<bool> {
        if let (Some(c), Some(r)) = (&candidate.inline_image, &reference.inline_image) {
            if !self.compare_dictionaries(&c.dict, &r.dict, path, diffs)? {
                return Ok(false);
            }
            if c.samples != r.samples {
                diffs.record(path, "Inline image samples differ.");
                return Ok(false);
            }
            return Ok(true);
        }

        for (c, r) in candidate.operands.iter().zip(&reference.operands) {
            if !self.compare_objects(Some(c), Some(r), path, diffs)? {
                return Ok(false);
            }
        }
        if candidate.operator != reference.operator {
            diffs.record(
                path,
                format!(
                    "Literal. Expected: {}. Found: {}",
                    reference.operator, candidate.operator
                ),
            );
            return Ok(false);
        }
        Ok(true)
    }
}

fn read_contents(doc: &dyn Document, contents: Option<&PdfObject>) -> DocResult<Vec<u8>> {
    match contents {
        Some(obj) => content_bytes(doc, obj),
        None => Ok(Vec::new()),
    }
}

fn own_resources<'d>(doc: &'d dyn Document, contents: Option<&'d PdfObject>) -> Option<&'d PdfDict> {
    let stream = doc.resolve(contents?)?.as_stream()?;
    doc.resolve_dict(stream.dict.get("Resources")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;
    use crate::tolerance::FloatTolerance;
    use pdfcmp_doc::{InMemoryDocument, PageSequence};
    use pdfcmp_types::PdfStream;

    /// A page whose resources and content stream resources both map `/CS0`.
    fn resourced_page(content: &[u8], page_cs: &str, stream_cs: Option<&str>) -> InMemoryDocument {
        let color_spaces = |cs: &str| PdfDict::new().with("ColorSpace", PdfDict::new().with("CS0", PdfObject::name(cs)));
        let mut doc = InMemoryDocument::new();
        let stream_dict = match stream_cs {
            Some(cs) => PdfDict::new().with("Resources", color_spaces(cs)),
            None => PdfDict::new(),
        };
        let contents = doc.add(PdfStream::new(stream_dict, content.to_vec()));
        doc.push_page(
            PdfDict::new()
                .with("Resources", color_spaces(page_cs))
                .with("Contents", contents),
        );
        doc
    }

    fn page_document(content: &[u8]) -> InMemoryDocument {
        let mut doc = InMemoryDocument::new();
        let contents = doc.add(PdfStream::new(PdfDict::new(), content.to_vec()));
        doc.push_page(
            PdfDict::new()
                .with("MediaBox", PdfObject::Array(vec![0i64.into(), 0i64.into(), 612i64.into(), 792i64.into()]))
                .with("Contents", contents),
        );
        doc
    }

    fn compare_pages(cand: &InMemoryDocument, reference: &InMemoryDocument, tolerance: FloatTolerance) -> (bool, DifferenceSet) {
        let comparator = Comparator::new(cand, reference, tolerance);
        let (cand_page, cand_ref) = comparator.candidate_pages().get(0).unwrap();
        let (ref_page, ref_ref) = comparator.reference_pages().get(0).unwrap();
        let mut path = ObjectPath::new(Some(ref_ref), Some(cand_ref));
        let mut diffs = DifferenceSet::new(5);
        let equal = comparator.compare_dictionaries(cand_page, ref_page, &mut path, &mut diffs).unwrap();
        (equal, diffs)
    }

    fn compare_bytes(cand: &[u8], reference: &[u8], tolerance: FloatTolerance) -> (bool, DifferenceSet) {
        let doc = InMemoryDocument::new();
        let comparator = Comparator::new(&doc, &doc, tolerance);
        let mut path = ObjectPath::default();
        let mut diffs = DifferenceSet::new(5);
        let equal = comparator
            .compare_content_bytes(cand, reference, None, None, &mut path, &mut diffs)
            .unwrap();
        (equal, diffs)
    }

    #[test]
    fn tolerance_absorbs_operand_drift() {
        let cand = page_document(b"BT /F1 12 Tf 72.004 720 Td (Hi) Tj ET");
        let reference = page_document(b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET");
        assert!(compare_pages(&cand, &reference, FloatTolerance::absolute(0.01)).0);

        let (equal, diffs) = compare_pages(&cand, &reference, FloatTolerance::exact());
        assert!(!equal);
        let entry = diffs.iter().next().unwrap();
        assert!(entry.message.starts_with("Stream lengths are different"));
    }

    #[test]
    fn operand_outside_tolerance_is_reported_under_contents() {
        let cand = page_document(b"0 0 100 100 re f");
        let reference = page_document(b"0 0 100 200 re f");
        let (equal, diffs) = compare_pages(&cand, &reference, FloatTolerance::absolute(0.5));
        assert!(!equal);
        let entry = diffs.iter().next().unwrap();
        assert_eq!(entry.message, "Number. Expected: 200. Found: 100");
        assert_eq!(entry.path.segments(), &[PathSegment::DictKey("/Contents".into())]);
    }

    #[test]
    fn whitespace_layout_does_not_matter() {
        let (equal, _) = compare_bytes(b"q\n1 0 0 1 0 0 cm\nQ", b"q 1 0 0 1 0 0   cm Q", FloatTolerance::absolute(0.001));
        assert!(equal);
    }

    #[test]
    fn different_command_lengths() {
        let (equal, diffs) = compare_bytes(b"1 2 m", b"1 2 3 m", FloatTolerance::absolute(0.1));
        assert!(!equal);
        assert_eq!(
            diffs.iter().next().unwrap().message,
            "Different command lengths. Expected: 4. Found: 3"
        );
    }

    #[test]
    fn extra_candidate_instructions_fail() {
        let (equal, diffs) = compare_bytes(b"q Q S", b"q Q", FloatTolerance::absolute(0.1));
        assert!(!equal);
        assert_eq!(
            diffs.iter().next().unwrap().message,
            "Different command lengths. Expected: 0. Found: 1"
        );
    }

    #[test]
    fn operator_mismatch() {
        let (equal, diffs) = compare_bytes(b"0 0 m f", b"0 0 m S", FloatTolerance::absolute(0.1));
        assert!(!equal);
        assert_eq!(diffs.iter().next().unwrap().message, "Literal. Expected: S. Found: f");
    }

    #[test]
    fn inline_images_compare_header_and_samples() {
        let image = |sample: u8| {
            let mut bytes = b"q BI /W 2 /H 1 /CS /G /BPC 8 ID ".to_vec();
            bytes.extend_from_slice(&[sample, 0x10]);
            bytes.extend_from_slice(b"\nEI Q");
            bytes
        };
        let tol = FloatTolerance::absolute(0.1);
        assert!(compare_bytes(&image(0x80), &image(0x80), tol).0);

        let (equal, diffs) = compare_bytes(&image(0x81), &image(0x80), tol);
        assert!(!equal);
        assert_eq!(diffs.iter().next().unwrap().message, "Inline image samples differ.");

        let wider = b"q BI /W 1 /H 2 /CS /G /BPC 8 ID \x80\x10\nEI Q";
        let (equal, diffs) = compare_bytes(wider, &image(0x80), tol);
        assert!(!equal);
        assert_eq!(diffs.iter().next().unwrap().message, "Number. Expected: 1. Found: 2");
    }

    #[test]
    fn stream_resources_apply_only_when_both_sides_declare_them() {
        let content = b"q BI /W 2 /H 1 /BPC 8 /CS /CS0 ID \x01\x02\x03\x04\x05\x06\nEI Q";
        let tol = FloatTolerance::absolute(0.1);

        let cand = resourced_page(content, "DeviceRGB", Some("DeviceGray"));
        let reference = resourced_page(content, "DeviceRGB", None);
        let (equal, diffs) = compare_pages(&cand, &reference, tol);
        assert!(equal, "{}", diffs.report());

        let gray = b"q BI /W 2 /H 1 /BPC 8 /CS /CS0 ID \x01\x02\nEI Q";
        let cand = resourced_page(gray, "DeviceRGB", Some("DeviceGray"));
        let reference = resourced_page(gray, "DeviceRGB", Some("DeviceGray"));
        assert!(compare_pages(&cand, &reference, tol).0);
    }

    #[test]
    fn unreadable_content_is_recorded() {
        let (equal, diffs) = compare_bytes(b"1 2", b"1 2 m", FloatTolerance::absolute(0.1));
        assert!(!equal);
        assert!(diffs.iter().next().unwrap().message.starts_with("Content stream cannot be read"));
    }

    #[test]
    fn split_contents_array_matches_single_stream() {
        let reference = page_document(b"q 1 0 0 1 5 5 cm Q");
        let mut cand = InMemoryDocument::new();
        let first = cand.add(PdfStream::new(PdfDict::new(), b"q 1 0 0 1".to_vec()));
        let second = cand.add(PdfStream::new(PdfDict::new(), b"5 5 cm Q".to_vec()));
        cand.push_page(
            PdfDict::new()
                .with("MediaBox", PdfObject::Array(vec![0i64.into(), 0i64.into(), 612i64.into(), 792i64.into()]))
                .with("Contents", PdfObject::Array(vec![first.into(), second.into()])),
        );
        assert_eq!(PageSequence::from_document(&cand).len(), 1);
        assert!(compare_pages(&cand, &reference, FloatTolerance::absolute(0.01)).0);
    }

    #[test]
    fn form_xobjects_compare_by_instruction_under_tolerance() {
        let form = |data: &[u8]| {
            PdfObject::from(PdfStream::new(
                PdfDict::new()
                    .with("Type", PdfObject::name("XObject"))
                    .with("Subtype", PdfObject::name("Form"))
                    .with("Length", data.len() as i64),
                data.to_vec(),
            ))
        };
        let doc = InMemoryDocument::new();
        let comparator = Comparator::new(&doc, &doc, FloatTolerance::absolute(0.01));
        assert!(comparator
            .objects_equal(&form(b"0 0 10.001 10 re f"), &form(b"0 0 10 10 re f"))
            .unwrap());
        let exact = Comparator::new(&doc, &doc, FloatTolerance::exact());
        assert!(!exact
            .objects_equal(&form(b"0 0 10.001 10 re f"), &form(b"0 0 10 10 re f"))
            .unwrap());
    }
}
