use std::collections::BTreeMap;
use std::fmt;

use crate::{ObjRef, PdfName, PdfString};

/// Variant tag of a [`PdfObject`], used to describe kind mismatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Null,
    Boolean,
    Number,
    String,
    Name,
    Literal,
    Array,
    Dictionary,
    Stream,
    Reference,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Null => "null",
            ObjectKind::Boolean => "boolean",
            ObjectKind::Number => "number",
            ObjectKind::String => "string",
            ObjectKind::Name => "name",
            ObjectKind::Literal => "literal",
            ObjectKind::Array => "array",
            ObjectKind::Dictionary => "dictionary",
            ObjectKind::Stream => "stream",
            ObjectKind::Reference => "indirect reference",
        };
        f.write_str(s)
    }
}

/// A node of the document graph.
///
/// The set of variants is closed: every comparator matches on it
/// exhaustively. Integers and reals share the `Number` variant because the
/// comparison rules treat them identically.
#[derive(Clone, Debug, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Number(f64),
    String(PdfString),
    Name(PdfName),
    /// A bare token with no other interpretation (an operator keyword that
    /// appears in operand position, for instance).
    Literal(Vec<u8>),
    Array(Vec<PdfObject>),
    Dictionary(PdfDict),
    Stream(PdfStream),
    Reference(ObjRef),
}

impl PdfObject {
    /// Shorthand for a name object.
    pub fn name(name: &str) -> Self {
        PdfObject::Name(PdfName::from(name))
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            PdfObject::Null => ObjectKind::Null,
            PdfObject::Boolean(_) => ObjectKind::Boolean,
            PdfObject::Number(_) => ObjectKind::Number,
            PdfObject::String(_) => ObjectKind::String,
            PdfObject::Name(_) => ObjectKind::Name,
            PdfObject::Literal(_) => ObjectKind::Literal,
            PdfObject::Array(_) => ObjectKind::Array,
            PdfObject::Dictionary(_) => ObjectKind::Dictionary,
            PdfObject::Stream(_) => ObjectKind::Stream,
            PdfObject::Reference(_) => ObjectKind::Reference,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PdfObject::Null)
    }

    pub fn as_reference(&self) -> Option<ObjRef> {
        match self {
            PdfObject::Reference(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            PdfObject::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PdfObject::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PdfObject]> {
        match self {
            PdfObject::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The dictionary of a dictionary or stream object.
    pub fn as_dict(&self) -> Option<&PdfDict> {
        match self {
            PdfObject::Dictionary(dict) => Some(dict),
            PdfObject::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&PdfStream> {
        match self {
            PdfObject::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl From<bool> for PdfObject {
    fn from(value: bool) -> Self {
        PdfObject::Boolean(value)
    }
}

impl From<f64> for PdfObject {
    fn from(value: f64) -> Self {
        PdfObject::Number(value)
    }
}

impl From<i64> for PdfObject {
    fn from(value: i64) -> Self {
        PdfObject::Number(value as f64)
    }
}

impl From<PdfName> for PdfObject {
    fn from(value: PdfName) -> Self {
        PdfObject::Name(value)
    }
}

impl From<PdfString> for PdfObject {
    fn from(value: PdfString) -> Self {
        PdfObject::String(value)
    }
}

impl From<ObjRef> for PdfObject {
    fn from(value: ObjRef) -> Self {
        PdfObject::Reference(value)
    }
}

impl From<PdfDict> for PdfObject {
    fn from(value: PdfDict) -> Self {
        PdfObject::Dictionary(value)
    }
}

impl From<PdfStream> for PdfObject {
    fn from(value: PdfStream) -> Self {
        PdfObject::Stream(value)
    }
}

impl From<Vec<PdfObject>> for PdfObject {
    fn from(value: Vec<PdfObject>) -> Self {
        PdfObject::Array(value)
    }
}

impl fmt::Display for PdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfObject::Null => f.write_str("null"),
            PdfObject::Boolean(b) => write!(f, "{b}"),
            PdfObject::Number(n) => f.write_str(&format_number(*n)),
            PdfObject::String(s) => write!(f, "{s}"),
            PdfObject::Name(n) => write!(f, "{n}"),
            PdfObject::Literal(raw) => f.write_str(&String::from_utf8_lossy(raw)),
            PdfObject::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            PdfObject::Dictionary(dict) => write!(f, "{dict}"),
            PdfObject::Stream(stream) => {
                write!(f, "{} stream({} bytes)", stream.dict, stream.data.len())
            }
            PdfObject::Reference(id) => write!(f, "{id} R"),
        }
    }
}

/// Render a number the way it would appear in a document: integral values
/// without a fractional part, everything else in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// A dictionary keyed by name, iterated in sorted key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PdfDict {
    entries: BTreeMap<PdfName, PdfObject>,
}

impl PdfDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<PdfObject>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&PdfObject> {
        self.entries.get(key.as_ref())
    }

    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<&mut PdfObject> {
        self.entries.get_mut(key.as_ref())
    }

    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<PdfName>, value: impl Into<PdfObject>) -> Option<PdfObject> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<PdfObject> {
        self.entries.remove(key.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &PdfName> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PdfName, &PdfObject)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `/Type` entry, if it is a name.
    pub fn type_name(&self) -> Option<&PdfName> {
        self.get("Type").and_then(PdfObject::as_name)
    }

    /// A leaf node of the page tree.
    pub fn is_page(&self) -> bool {
        self.type_name().is_some_and(|t| t.is("Page"))
    }

    /// An intermediate node of the page tree.
    pub fn is_pages(&self) -> bool {
        self.type_name().is_some_and(|t| t.is("Pages"))
    }
}

impl FromIterator<(PdfName, PdfObject)> for PdfDict {
    fn from_iter<I: IntoIterator<Item = (PdfName, PdfObject)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl fmt::Display for PdfDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<<")?;
        for (key, value) in &self.entries {
            write!(f, "{key} {value}")?;
        }
        f.write_str(">>")
    }
}

/// A stream: its dictionary plus the raw bytes as stored (still encoded).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDict,
    pub data: Vec<u8>,
}

impl PdfStream {
    pub fn new(dict: PdfDict, data: impl Into<Vec<u8>>) -> Self {
        Self { dict, data: data.into() }
    }

    /// A Form XObject, whose content is itself an instruction stream.
    pub fn is_form_xobject(&self) -> bool {
        self.dict.get("Subtype").and_then(PdfObject::as_name).is_some_and(|s| s.is("Form"))
    }
}
