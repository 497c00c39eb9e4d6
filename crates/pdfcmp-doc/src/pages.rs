use std::collections::HashSet;

use pdfcmp_types::{ObjRef, PdfDict, PdfObject};
use tracing::debug;

use crate::traits::Document;

/// Leaf pages of a document in page-tree order, each paired with its
/// indirect reference.
///
/// Built once by a depth-first walk from the catalog's `/Pages` node; nested
/// `/Pages` nodes are descended through their `/Kids`, and a node without
/// `/Kids` simply contributes nothing. A page-tree node reached twice is
/// walked only once.
#[derive(Debug, Clone, Default)]
pub struct PageSequence<'d> {
    pages: Vec<(&'d PdfDict, ObjRef)>,
}

impl<'d> PageSequence<'d> {
    pub fn empty() -> Self {
        Self { pages: Vec::new() }
    }

    pub fn from_document<D: Document + ?Sized>(doc: &'d D) -> Self {
        let mut seq = Self::empty();
        let mut visited = HashSet::new();
        if let Some(root) = doc.catalog().and_then(|catalog| catalog.get("Pages")) {
            seq.collect(doc, root, &mut visited);
        }
        debug!(pages = seq.len(), "page tree walked");
        seq
    }

    fn collect<D: Document + ?Sized>(&mut self, doc: &'d D, node: &'d PdfObject, visited: &mut HashSet<ObjRef>) {
        let Some(id) = node.as_reference() else {
            return;
        };
        if !visited.insert(id) {
            return;
        }
        let Some(dict) = doc.resolve_dict(node) else {
            return;
        };
        if dict.is_pages() {
            let Some(kids) = dict.get("Kids").and_then(|k| doc.resolve(k)).and_then(PdfObject::as_array) else {
                return;
            };
            for kid in kids {
                self.collect(doc, kid, visited);
            }
        } else if dict.is_page() {
            self.pages.push((dict, id));
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The page dictionary and reference at `index`.
    pub fn get(&self, index: usize) -> Option<(&'d PdfDict, ObjRef)> {
        self.pages.get(index).copied()
    }

    /// Position of the page with reference `id`, if it is a leaf of the tree.
    pub fn index_of(&self, id: ObjRef) -> Option<usize> {
        self.pages.iter().position(|(_, page)| *page == id)
    }

    pub fn refs(&self) -> impl Iterator<Item = ObjRef> + '_ {
        self.pages.iter().map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'d PdfDict, ObjRef)> + '_ {
        self.pages.iter().copied()
    }
}
