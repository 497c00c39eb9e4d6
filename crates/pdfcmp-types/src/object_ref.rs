use std::fmt;

use serde::{Deserialize, Serialize};

/// Indirect-reference key of a document object.
///
/// An `ObjRef` names a node stored elsewhere in the document by its object
/// number and generation. Two keys denote the same node iff both fields match,
/// which makes `ObjRef` usable as a map key, a comparison-path anchor, and an
/// entry of the cycle guard.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjRef {
    /// Object number.
    pub number: u32,
    /// Generation number.
    pub generation: u16,
}

impl ObjRef {
    /// Create a key from an object number and generation.
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({} {})", self.number, self.generation)
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

impl From<(u32, u16)> for ObjRef {
    fn from((number, generation): (u32, u16)) -> Self {
        Self::new(number, generation)
    }
}

impl From<ObjRef> for (u32, u16) {
    fn from(id: ObjRef) -> Self {
        (id.number, id.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_uses_both_fields() {
        assert_eq!(ObjRef::new(4, 0), ObjRef::new(4, 0));
        assert_ne!(ObjRef::new(4, 0), ObjRef::new(4, 1));
        assert_ne!(ObjRef::new(4, 0), ObjRef::new(5, 0));
    }

    #[test]
    fn usable_as_hash_key() {
        let mut set = HashSet::new();
        set.insert(ObjRef::new(1, 0));
        set.insert(ObjRef::new(1, 0));
        set.insert(ObjRef::new(1, 2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_is_number_then_generation() {
        assert_eq!(ObjRef::new(12, 3).to_string(), "12 3");
        assert_eq!(format!("{:?}", ObjRef::new(12, 3)), "ObjRef(12 3)");
    }

    #[test]
    fn tuple_conversion_roundtrip() {
        let id: ObjRef = (7, 1).into();
        let back: (u32, u16) = id.into();
        assert_eq!(back, (7, 1));
    }

    #[test]
    fn ordering_is_number_first() {
        assert!(ObjRef::new(1, 9) < ObjRef::new(2, 0));
        assert!(ObjRef::new(2, 0) < ObjRef::new(2, 1));
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjRef::new(42, 0);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ObjRef = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
