//! Addresses of differences inside the object graph.
//!
//! An [`ObjectPath`] names where a comparison currently is: the pair of
//! indirect objects it started from and the segments walked since. Crossing
//! another indirect reference starts a fresh path anchored at the new pair,
//! while the pairs crossed so far stay in a shared guard history used to break
//! cycles.
//!
//! Both the segment list and the guard history are shared behind `Arc`s, so
//! cloning a path to record it is a reference-count bump; the live path
//! copies its segments only when it is next extended.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use pdfcmp_types::{ObjRef, PdfName};

use crate::report::ReportNode;

/// One step below the path's root pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A dictionary entry, stored as its `/Name` rendering.
    DictKey(String),
    ArrayIndex(usize),
    /// A byte (or character) offset inside a stream or string.
    Offset(usize),
}

impl PathSegment {
    pub fn to_report_node(&self) -> ReportNode {
        match self {
            PathSegment::DictKey(key) => ReportNode::new("dictKey").with_text(key.clone()),
            PathSegment::ArrayIndex(i) => ReportNode::new("arrayIndex").with_text(i.to_string()),
            PathSegment::Offset(o) => ReportNode::new("offset").with_text(o.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::DictKey(key) => write!(f, "Dict key: {key}"),
            PathSegment::ArrayIndex(i) => write!(f, "Array index: {i}"),
            PathSegment::Offset(o) => write!(f, "Offset: {o}"),
        }
    }
}

#[derive(Debug)]
struct GuardLink {
    reference: ObjRef,
    candidate: ObjRef,
    parent: Option<Arc<GuardLink>>,
}

/// Location of a comparison inside the object graph.
///
/// Equality and hashing cover the root pair and the segments only; two
/// paths that reach the same place through different indirections are the
/// same address.
#[derive(Clone, Default)]
pub struct ObjectPath {
    reference_root: Option<ObjRef>,
    candidate_root: Option<ObjRef>,
    segments: Arc<Vec<PathSegment>>,
    guard: Option<Arc<GuardLink>>,
}

impl ObjectPath {
    /// A path anchored at a pair of indirect objects, with an empty guard.
    pub fn new(reference_root: Option<ObjRef>, candidate_root: Option<ObjRef>) -> Self {
        Self {
            reference_root,
            candidate_root,
            segments: Arc::default(),
            guard: None,
        }
    }

    pub fn reference_root(&self) -> Option<ObjRef> {
        self.reference_root
    }

    pub fn candidate_root(&self) -> Option<ObjRef> {
        self.candidate_root
    }

    /// Segments from the outermost to the innermost.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn push_dict_key(&mut self, key: &PdfName) {
        self.push(PathSegment::DictKey(key.to_string()));
    }

    pub fn push_array_index(&mut self, index: usize) {
        self.push(PathSegment::ArrayIndex(index));
    }

    pub fn push_offset(&mut self, offset: usize) {
        self.push(PathSegment::Offset(offset));
    }

    fn push(&mut self, segment: PathSegment) {
        Arc::make_mut(&mut self.segments).push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        Arc::make_mut(&mut self.segments).pop()
    }

    /// The path to use after crossing the reference pair
    /// (`reference`, `candidate`): anchored at that pair, with no segments, and
    /// with the pair added to the guard history.
    pub fn reset_at(&self, reference: ObjRef, candidate: ObjRef) -> ObjectPath {
        ObjectPath {
            reference_root: Some(reference),
            candidate_root: Some(candidate),
            segments: Arc::default(),
            guard: Some(Arc::new(GuardLink {
                reference,
                candidate,
                parent: self.guard.clone(),
            })),
        }
    }

    /// Whether the pair is already being compared further up the stack.
    pub fn is_comparing(&self, reference: ObjRef, candidate: ObjRef) -> bool {
        let mut link = self.guard.as_deref();
        while let Some(node) = link {
            if node.reference == reference && node.candidate == candidate {
                return true;
            }
            link = node.parent.as_deref();
        }
        false
    }

    /// Number of reference pairs in the guard history.
    pub fn guard_depth(&self) -> usize {
        let mut depth = 0;
        let mut link = self.guard.as_deref();
        while let Some(node) = link {
            depth += 1;
            link = node.parent.as_deref();
        }
        depth
    }

    /// `path` element: a `base` node naming both roots, then one node per
    /// segment from the outermost in.
    pub fn to_report_node(&self) -> ReportNode {
        let base = ReportNode::new("base")
            .with_attribute("cmp", format!("{} obj", root_label(self.reference_root)))
            .with_attribute("out", format!("{} obj", root_label(self.candidate_root)));
        let mut node = ReportNode::new("path").with_child(base);
        for segment in self.segments.iter() {
            node.push(segment.to_report_node());
        }
        node
    }
}

fn root_label(root: Option<ObjRef>) -> String {
    root.map_or_else(|| "null".to_string(), |r| r.to_string())
}

impl PartialEq for ObjectPath {
    fn eq(&self, other: &Self) -> bool {
        self.reference_root == other.reference_root
            && self.candidate_root == other.candidate_root
            && self.segments == other.segments
    }
}

impl Eq for ObjectPath {}

impl Hash for ObjectPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference_root.hash(state);
        self.candidate_root.hash(state);
        self.segments.hash(state);
    }
}

impl fmt::Debug for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPath")
            .field("reference_root", &self.reference_root)
            .field("candidate_root", &self.candidate_root)
            .field("segments", &self.segments)
            .field("guard_depth", &self.guard_depth())
            .finish()
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Base cmp object: {} obj. Base out object: {} obj",
            root_label(self.reference_root),
            root_label(self.candidate_root)
        )?;
        for segment in self.segments.iter() {
            write!(f, "\n{segment}")?;
        }
        Ok(())
    }
}
