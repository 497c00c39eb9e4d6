use std::fmt;

/// A string object: raw bytes plus the syntax it was written in.
///
/// Equality is byte equality of the content; the `hex` flag only records
/// whether the source used `<...>` syntax and does not take part in it.
#[derive(Clone, Default, Eq)]
pub struct PdfString {
    bytes: Vec<u8>,
    hex: bool,
}

impl PdfString {
    /// A string written in literal `(...)` syntax.
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), hex: false }
    }

    /// A string written in hexadecimal `<...>` syntax.
    pub fn hex(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), hex: true }
    }

    /// The raw bytes of the string.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the string was written in hexadecimal syntax.
    pub fn is_hex(&self) -> bool {
        self.hex
    }

    /// Decode the string as a text string.
    ///
    /// UTF-16BE and UTF-8 are recognized by their byte order marks; anything
    /// else is read as PDFDocEncoding.
    pub fn to_text(&self) -> String {
        match self.bytes.as_slice() {
            [0xfe, 0xff, rest @ ..] => {
                let units: Vec<u16> = rest
                    .chunks(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            [0xef, 0xbb, 0xbf, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
            bytes => bytes.iter().map(|&b| pdf_doc_char(b)).collect(),
        }
    }
}

impl PartialEq for PdfString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl fmt::Debug for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfString({self})")
    }
}

impl fmt::Display for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hex {
            write!(f, "<{}>", hex::encode_upper(&self.bytes))
        } else {
            write!(f, "({})", self.to_text())
        }
    }
}

/// PDFDocEncoding differs from Latin-1 in 0x18..=0x1F and 0x80..=0xA0.
fn pdf_doc_char(b: u8) -> char {
    let code = match b {
        0x18 => 0x02d8,
        0x19 => 0x02c7,
        0x1a => 0x02c6,
        0x1b => 0x02d9,
        0x1c => 0x02dd,
        0x1d => 0x02db,
        0x1e => 0x02da,
        0x1f => 0x02dc,
        0x80 => 0x2022,
        0x81 => 0x2020,
        0x82 => 0x2021,
        0x83 => 0x2026,
        0x84 => 0x2014,
        0x85 => 0x2013,
        0x86 => 0x0192,
        0x87 => 0x2044,
        0x88 => 0x2039,
        0x89 => 0x203a,
        0x8a => 0x2212,
        0x8b => 0x2030,
        0x8c => 0x201e,
        0x8d => 0x201c,
        0x8e => 0x201d,
        0x8f => 0x2018,
        0x90 => 0x2019,
        0x91 => 0x201a,
        0x92 => 0x2122,
        0x93 => 0xfb01,
        0x94 => 0xfb02,
        0x95 => 0x0141,
        0x96 => 0x0152,
        0x97 => 0x0160,
        0x98 => 0x0178,
        0x99 => 0x017d,
        0x9a => 0x0131,
        0x9b => 0x0142,
        0x9c => 0x0153,
        0x9d => 0x0161,
        0x9e => 0x017e,
        0x9f => 0xfffd,
        0xa0 => 0x20ac,
        other => other as u32,
    };
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}
