use std::collections::BTreeMap;

use pdfcmp_types::{ObjRef, PdfDict, PdfObject};

use crate::traits::Document;

/// In-memory document backed by a `BTreeMap`.
///
/// Useful for testing and for callers that build documents programmatically.
/// Object numbers are allocated sequentially from 1 with generation 0.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocument {
    objects: BTreeMap<ObjRef, PdfObject>,
    trailer: PdfDict,
    next_number: u32,
}

impl InMemoryDocument {
    /// Create an empty document with no catalog.
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            trailer: PdfDict::new(),
            next_number: 1,
        }
    }

    /// Store `obj` under a freshly allocated reference.
    pub fn add(&mut self, obj: impl Into<PdfObject>) -> ObjRef {
        let id = self.reserve();
        self.objects.insert(id, obj.into());
        id
    }

    /// Allocate a reference without storing anything yet, so that objects
    /// which point at each other can be built before either exists.
    pub fn reserve(&mut self) -> ObjRef {
        let id = ObjRef::new(self.next_number.max(1), 0);
        self.next_number = id.number + 1;
        id
    }

    /// Store `obj` under an explicit reference, replacing any previous value.
    pub fn insert(&mut self, id: ObjRef, obj: impl Into<PdfObject>) -> Option<PdfObject> {
        self.next_number = self.next_number.max(id.number + 1);
        self.objects.insert(id, obj.into())
    }

    /// Point the trailer's `/Root` at `catalog`.
    pub fn set_root(&mut self, catalog: ObjRef) {
        self.trailer.insert("Root", catalog);
    }

    pub fn set_trailer_entry(&mut self, key: &str, value: impl Into<PdfObject>) {
        self.trailer.insert(key, value);
    }

    pub fn get_mut(&mut self, id: ObjRef) -> Option<&mut PdfObject> {
        self.objects.get_mut(&id)
    }

    /// Number of indirect objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append a page to the root of the page tree.
    ///
    /// Creates the catalog and the root `/Pages` node on first use. The page
    /// dictionary gets `/Type /Page` and a `/Parent` link; the root node's
    /// `/Kids` and `/Count` are kept current.
    pub fn push_page(&mut self, page: PdfDict) -> ObjRef {
        let pages_ref = self.ensure_page_root();
        let page = page.with("Type", PdfObject::name("Page")).with("Parent", pages_ref);
        let page_ref = self.add(page);
        if let Some(PdfObject::Dictionary(pages)) = self.objects.get_mut(&pages_ref) {
            if let Some(PdfObject::Array(kids)) = pages.get_mut("Kids") {
                kids.push(PdfObject::Reference(page_ref));
                let count = kids.len() as i64;
                pages.insert("Count", count);
            }
        }
        page_ref
    }

    fn ensure_page_root(&mut self) -> ObjRef {
        if let Some(id) = self.catalog().and_then(|c| c.get("Pages")).and_then(PdfObject::as_reference) {
            return id;
        }
        let pages_ref = self.add(
            PdfDict::new()
                .with("Type", PdfObject::name("Pages"))
                .with("Kids", Vec::<PdfObject>::new())
                .with("Count", 0i64),
        );
        match self.trailer.get("Root").and_then(PdfObject::as_reference) {
            Some(root) => {
                if let Some(PdfObject::Dictionary(catalog)) = self.objects.get_mut(&root) {
                    catalog.insert("Pages", pages_ref);
                }
            }
            None => {
                let root = self.add(
                    PdfDict::new()
                        .with("Type", PdfObject::name("Catalog"))
                        .with("Pages", pages_ref),
                );
                self.set_root(root);
            }
        }
        pages_ref
    }
}

impl Document for InMemoryDocument {
    fn object(&self, id: ObjRef) -> Option<&PdfObject> {
        self.objects.get(&id)
    }

    fn trailer(&self) -> &PdfDict {
        &self.trailer
    }
}
