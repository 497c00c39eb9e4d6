use pdfcmp_types::{ObjRef, PdfDict, PdfObject};

/// Upper bound on reference-to-reference hops followed by [`Document::resolve`].
const MAX_REFERENCE_CHAIN: usize = 32;

/// Read access to a document's object graph.
///
/// Implementations own every object for the lifetime of the borrow; callers
/// only read. Objects are addressed by [`ObjRef`] and may refer to each other
/// in cycles, so nothing here walks the graph recursively.
pub trait Document: Send + Sync {
    /// Look up an indirect object. Returns `None` for unknown references.
    fn object(&self, id: ObjRef) -> Option<&PdfObject>;

    /// The trailer dictionary.
    fn trailer(&self) -> &PdfDict;

    /// Resolve `obj` to its direct form.
    ///
    /// Reference chains are followed up to a fixed depth. A dangling
    /// reference, an explicit `null`, or a chain that never bottoms out all
    /// resolve to `None`.
    fn resolve<'a>(&'a self, obj: &'a PdfObject) -> Option<&'a PdfObject> {
        let mut current = obj;
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                PdfObject::Reference(id) => current = self.object(*id)?,
                PdfObject::Null => return None,
                direct => return Some(direct),
            }
        }
        None
    }

    /// Resolve `obj` and return its dictionary (a stream's dictionary counts).
    fn resolve_dict<'a>(&'a self, obj: &'a PdfObject) -> Option<&'a PdfDict> {
        self.resolve(obj).and_then(PdfObject::as_dict)
    }

    /// The document catalog, reached through the trailer's `/Root` entry.
    fn catalog(&self) -> Option<&PdfDict> {
        self.trailer().get("Root").and_then(|root| self.resolve_dict(root))
    }

    /// The document information dictionary, reached through the trailer's
    /// `/Info` entry.
    fn info(&self) -> Option<&PdfDict> {
        self.trailer().get("Info").and_then(|info| self.resolve_dict(info))
    }

    /// An entry of the catalog, left unresolved so the caller can tell a
    /// direct value from an indirect one.
    fn catalog_entry(&self, key: &str) -> Option<&PdfObject> {
        self.catalog()?.get(key)
    }
}
