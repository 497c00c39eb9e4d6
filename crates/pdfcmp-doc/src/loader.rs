use std::path::Path;

use pdfcmp_types::{ObjRef, PdfDict, PdfName, PdfObject, PdfStream, PdfString};
use tracing::{debug, info};

use crate::error::{DocError, DocResult};
use crate::memory::InMemoryDocument;
use crate::traits::Document;

/// Parse the file at `path` into an [`InMemoryDocument`].
pub fn load_document(path: impl AsRef<Path>) -> DocResult<InMemoryDocument> {
    let path = path.as_ref();
    let parsed = lopdf::Document::load(path)?;
    let doc = convert(&parsed)?;
    info!(path = %path.display(), objects = doc.len(), "document loaded");
    Ok(doc)
}

/// Parse a document held in memory.
pub fn load_document_from_memory(bytes: &[u8]) -> DocResult<InMemoryDocument> {
    let parsed = lopdf::Document::load_mem(bytes)?;
    let doc = convert(&parsed)?;
    debug!(bytes = bytes.len(), objects = doc.len(), "document loaded from memory");
    Ok(doc)
}

fn convert(parsed: &lopdf::Document) -> DocResult<InMemoryDocument> {
    let mut doc = InMemoryDocument::new();
    for (&(number, generation), object) in &parsed.objects {
        doc.insert(ObjRef::new(number, generation), convert_object(object));
    }
    for (key, value) in parsed.trailer.iter() {
        doc.set_trailer_entry(&String::from_utf8_lossy(key), convert_object(value));
    }
    if doc.catalog().is_none() {
        return Err(DocError::MissingCatalog);
    }
    Ok(doc)
}

fn convert_object(object: &lopdf::Object) -> PdfObject {
    match object {
        lopdf::Object::Null => PdfObject::Null,
        lopdf::Object::Boolean(b) => PdfObject::Boolean(*b),
        lopdf::Object::Integer(i) => PdfObject::Number(*i as f64),
        lopdf::Object::Real(r) => PdfObject::Number(widen_real(*r)),
        lopdf::Object::Name(name) => PdfObject::Name(PdfName::new(name.clone())),
        lopdf::Object::String(bytes, lopdf::StringFormat::Hexadecimal) => {
            PdfObject::String(PdfString::hex(bytes.clone()))
        }
        lopdf::Object::String(bytes, lopdf::StringFormat::Literal) => {
            PdfObject::String(PdfString::literal(bytes.clone()))
        }
        lopdf::Object::Array(items) => PdfObject::Array(items.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfObject::Dictionary(convert_dict(dict)),
        lopdf::Object::Stream(stream) => {
            PdfObject::Stream(PdfStream::new(convert_dict(&stream.dict), stream.content.clone()))
        }
        lopdf::Object::Reference((number, generation)) => {
            PdfObject::Reference(ObjRef::new(*number, *generation))
        }
    }
}

/// Widen a parsed real to the `f64` closest to its shortest decimal form,
/// so `0.1` stays `0.1` rather than `0.10000000149011612`.
fn widen_real(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

fn convert_dict(dict: &lopdf::Dictionary) -> PdfDict {
    dict.iter()
        .map(|(key, value)| (PdfName::new(key.clone()), convert_object(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageSequence;
    use lopdf::{dictionary, Stream};

    fn sample_pdf() -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Stream::new(dictionary! {}, b"BT /F1 12 Tf (Hi) Tj ET".to_vec());
        let content_id = doc.add_object(content);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn loads_pages_and_content() {
        let doc = load_document_from_memory(&sample_pdf()).unwrap();
        let pages = PageSequence::from_document(&doc);
        assert_eq!(pages.len(), 1);
        let (page, _) = pages.get(0).unwrap();
        let media_box = page.get("MediaBox").and_then(PdfObject::as_array).unwrap();
        assert_eq!(media_box[2], PdfObject::Number(612.0));
        let contents = page.get("Contents").unwrap();
        let bytes = crate::content::content_bytes(&doc, contents).unwrap();
        assert_eq!(bytes, b"BT /F1 12 Tf (Hi) Tj ET");
    }

    #[test]
    fn loads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        std::fs::write(&path, sample_pdf()).unwrap();
        let doc = load_document(&path).unwrap();
        assert!(doc.catalog().is_some_and(|c| c.type_name().is_some_and(|t| t.is("Catalog"))));
    }

    #[test]
    fn reals_keep_their_decimal_value() {
        assert_eq!(convert_object(&lopdf::Object::Real(0.1)), PdfObject::Number(0.1));
        assert_eq!(convert_object(&lopdf::Object::Real(-12.75)), PdfObject::Number(-12.75));
    }

    #[test]
    fn trailer_info_is_reachable() {
        let mut parsed = lopdf::Document::load_mem(&sample_pdf()).unwrap();
        let info_id = parsed.add_object(dictionary! {
            "Title" => lopdf::Object::string_literal("Quarterly"),
        });
        parsed.trailer.set("Info", info_id);
        let mut bytes = Vec::new();
        parsed.save_to(&mut bytes).unwrap();

        let doc = load_document_from_memory(&bytes).unwrap();
        let title = doc.info().and_then(|info| info.get("Title")).unwrap();
        assert_eq!(title, &PdfObject::String(PdfString::literal(b"Quarterly".to_vec())));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(load_document_from_memory(b"definitely not a pdf").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_document("/nonexistent/pdfcmp/input.pdf").is_err());
    }
}
