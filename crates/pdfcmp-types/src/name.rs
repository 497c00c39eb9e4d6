use std::borrow::Borrow;
use std::fmt;

/// A name object, stored as its decoded bytes (no leading `/`, `#xx` escapes
/// already resolved).
///
/// Names compare byte-for-byte. `Display` renders the canonical `/Name` form,
/// escaping delimiters and non-printable bytes as `#xx`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PdfName(Vec<u8>);

impl PdfName {
    /// Create a name from its decoded bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The decoded bytes of the name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if the name equals `other` exactly.
    pub fn is(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }

    /// Lossy UTF-8 view of the name, without the leading `/`.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl AsRef<[u8]> for PdfName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for PdfName {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for PdfName {
    fn from(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }
}

impl From<String> for PdfName {
    fn from(name: String) -> Self {
        Self(name.into_bytes())
    }
}

impl From<Vec<u8>> for PdfName {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfName({self})")
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for &b in &self.0 {
            if needs_escape(b) {
                write!(f, "#{b:02X}")?;
            } else {
                write!(f, "{}", b as char)?;
            }
        }
        Ok(())
    }
}

fn needs_escape(b: u8) -> bool {
    !(0x21..=0x7e).contains(&b)
        || matches!(b, b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_adds_slash() {
        assert_eq!(PdfName::from("Type").to_string(), "/Type");
    }

    #[test]
    fn display_escapes_delimiters_and_spaces() {
        assert_eq!(PdfName::from("A B").to_string(), "/A#20B");
        assert_eq!(PdfName::from("x#y").to_string(), "/x#23y");
    }

    #[test]
    fn is_matches_exact_bytes() {
        let name = PdfName::from("Parent");
        assert!(name.is("Parent"));
        assert!(!name.is("parent"));
        assert!(!name.is("P"));
    }

    #[test]
    fn borrow_allows_slice_lookup() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(PdfName::from("Kids"), 1);
        assert_eq!(map.get(b"Kids".as_slice()), Some(&1));
    }
}
