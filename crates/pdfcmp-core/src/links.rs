//! Link-annotation comparison.
//!
//! Links are compared page by page, in annotation order: the page their
//! destination points at, their rectangle, and their simple (non-container)
//! parameters. Indirect, array and dictionary parameters are compared by
//! kind only.

use std::fmt;

use pdfcmp_doc::{Document, PageSequence};
use pdfcmp_types::{format_number, ObjectKind, PdfDict, PdfObject};

/// Keys that are either compared separately or not meaningful between
/// documents.
const SKIPPED_KEYS: [&str; 5] = ["Rect", "Dest", "A", "P", "Parent"];

/// A `/Link` annotation reduced to what is compared.
#[derive(Debug, Clone, PartialEq)]
struct LinkAnnotation {
    /// Zero-based index of the destination page, when the destination is
    /// an explicit page reference.
    destination: Option<usize>,
    rect: Vec<f64>,
    params: PdfDict,
}

impl LinkAnnotation {
    fn read(doc: &dyn Document, pages: &PageSequence<'_>, annot: &PdfDict) -> Self {
        let rect = annot
            .get("Rect")
            .and_then(|r| doc.resolve(r))
            .and_then(PdfObject::as_array)
            .map(|items| items.iter().filter_map(|n| doc.resolve(n)?.as_number()).collect())
            .unwrap_or_default();
        let mut params = PdfDict::new();
        for (key, value) in annot.iter() {
            if !SKIPPED_KEYS.iter().any(|k| key.is(k)) {
                params.insert(key.clone(), value.clone());
            }
        }
        Self {
            destination: destination_page(doc, pages, annot),
            rect,
            params,
        }
    }

    fn matches(&self, other: &LinkAnnotation) -> bool {
        if self.destination != other.destination || self.rect != other.rect {
            return false;
        }
        if self.params.len() != other.params.len() {
            return false;
        }
        self.params.iter().all(|(key, value)| match other.params.get(key) {
            Some(theirs) if theirs.kind() == value.kind() => !is_simple(value.kind()) || theirs == value,
            _ => false,
        })
    }
}

impl fmt::Display for LinkAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rect: Vec<String> = self.rect.iter().map(|n| format_number(*n)).collect();
        write!(f, "Link [{}] to page ", rect.join(" "))?;
        match self.destination {
            Some(page) => write!(f, "{}", page + 1)?,
            None => f.write_str("none")?,
        }
        write!(f, " {}", self.params)
    }
}

fn is_simple(kind: ObjectKind) -> bool {
    matches!(
        kind,
        ObjectKind::Null | ObjectKind::Boolean | ObjectKind::Number | ObjectKind::String | ObjectKind::Name
    )
}

/// Page index of an explicit destination in `/Dest` or a GoTo action's `/D`.
fn destination_page(doc: &dyn Document, pages: &PageSequence<'_>, annot: &PdfDict) -> Option<usize> {
    let dest = match annot.get("Dest") {
        Some(dest) => dest,
        None => {
            let action = doc.resolve_dict(annot.get("A")?)?;
            if !action.get("S").and_then(PdfObject::as_name).is_some_and(|s| s.is("GoTo")) {
                return None;
            }
            action.get("D")?
        }
    };
    let target = doc.resolve(dest)?.as_array()?.first()?.as_reference()?;
    pages.index_of(target)
}

fn page_links(doc: &dyn Document, pages: &PageSequence<'_>, page: &PdfDict) -> Vec<LinkAnnotation> {
    let Some(annots) = page.get("Annots").and_then(|a| doc.resolve(a)).and_then(PdfObject::as_array) else {
        return Vec::new();
    };
    annots
        .iter()
        .filter_map(|a| doc.resolve_dict(a))
        .filter(|annot| annot.get("Subtype").and_then(PdfObject::as_name).is_some_and(|s| s.is("Link")))
        .map(|annot| LinkAnnotation::read(doc, pages, annot))
        .collect()
}

/// Compare the link annotations of the pages both documents have.
///
/// Returns `None` when every link matches, otherwise a message naming the
/// first page whose links differ.
pub fn compare_links(out_doc: &dyn Document, cmp_doc: &dyn Document) -> Option<String> {
    let out_pages = PageSequence::from_document(out_doc);
    let cmp_pages = PageSequence::from_document(cmp_doc);
    for (index, ((out_page, _), (cmp_page, _))) in out_pages.iter().zip(cmp_pages.iter()).enumerate() {
        let out_links = page_links(out_doc, &out_pages, out_page);
        let cmp_links = page_links(cmp_doc, &cmp_pages, cmp_page);
        if out_links.len() != cmp_links.len() {
            return Some(format!("Different number of links on page {}.", index + 1));
        }
        if let Some((cmp_link, out_link)) = cmp_links.iter().zip(&out_links).find(|(c, o)| !c.matches(o)) {
            return Some(format!("Different links on page {}.\n{cmp_link}\n{out_link}", index + 1));
        }
    }
    None
}
