use std::fmt;

use pdfcmp_types::{PdfDict, PdfName, PdfObject, PdfString};
use tracing::debug;

use crate::decode::{decode_stream, hex_val};
use crate::error::{DocError, DocResult};
use crate::lexer::{is_delim, is_whitespace, Cursor};
use crate::traits::Document;

const MAX_NESTING: usize = 64;

/// One instruction of a content stream: an operator and the operands that
/// preceded it, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfObject>,
    /// Set for `BI` only.
    pub inline_image: Option<InlineImage>,
}

impl ContentOp {
    /// Number of tokens in the instruction, operator included.
    pub fn token_count(&self) -> usize {
        self.operands.len() + 1
    }
}

impl fmt::Display for ContentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for operand in &self.operands {
            write!(f, "{operand} ")?;
        }
        f.write_str(&self.operator)
    }
}

/// An inline image: its header (with abbreviations expanded) and raw samples.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub dict: PdfDict,
    pub samples: Vec<u8>,
}

/// Resource context for inline images whose colour space is named rather
/// than given inline.
#[derive(Clone, Copy)]
pub struct ResourceScope<'a> {
    pub doc: &'a dyn Document,
    pub resources: Option<&'a PdfDict>,
}

impl<'a> ResourceScope<'a> {
    pub fn new(doc: &'a dyn Document, resources: Option<&'a PdfDict>) -> Self {
        Self { doc, resources }
    }

    fn named_color_space(&self, name: &PdfName) -> Option<&'a PdfObject> {
        let spaces = self.resources?.get("ColorSpace")?;
        let spaces = self.doc.resolve_dict(spaces)?;
        self.doc.resolve(spaces.get(name)?)
    }
}

impl fmt::Debug for ResourceScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceScope")
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

/// Pull tokenizer over decoded content-stream bytes.
#[derive(Debug, Clone)]
pub struct ContentParser<'a> {
    cur: Cursor<'a>,
}

enum Token {
    Object(PdfObject),
    Keyword(Vec<u8>),
    ArrayEnd,
    DictEnd,
}

impl<'a> ContentParser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { cur: Cursor::new(bytes) }
    }

    /// Parse the next instruction.
    ///
    /// Returns `Ok(None)` at the end of the stream. Operands left over at
    /// the end with no operator to consume them are a syntax error.
    pub fn next_op(&mut self, scope: Option<&ResourceScope<'_>>) -> DocResult<Option<ContentOp>> {
        let mut operands = Vec::new();
        loop {
            self.cur.skip_ws_and_comments();
            if self.cur.eof() {
                if operands.is_empty() {
                    return Ok(None);
                }
                return Err(self.error("operands without an operator"));
            }
            match self.next_token(0)? {
                Token::Object(obj) => operands.push(obj),
                Token::Keyword(kw) => {
                    let operator = String::from_utf8_lossy(&kw).into_owned();
                    let inline_image = if kw == b"BI" {
                        Some(self.inline_image(scope)?)
                    } else {
                        None
                    };
                    return Ok(Some(ContentOp { operator, operands, inline_image }));
                }
                Token::ArrayEnd => return Err(self.error("unbalanced ']'")),
                Token::DictEnd => return Err(self.error("unbalanced '>>'")),
            }
        }
    }

    /// Collect every remaining instruction.
    pub fn collect_ops(mut self, scope: Option<&ResourceScope<'_>>) -> DocResult<Vec<ContentOp>> {
        let mut ops = Vec::new();
        while let Some(op) = self.next_op(scope)? {
            ops.push(op);
        }
        Ok(ops)
    }

    fn error(&self, reason: &str) -> DocError {
        DocError::Content {
            offset: self.cur.pos,
            reason: reason.to_string(),
        }
    }

    fn next_token(&mut self, depth: usize) -> DocResult<Token> {
        if depth > MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        let Some(b) = self.cur.peek() else {
            return Err(self.error("unexpected end of content"));
        };
        match b {
            b'/' => Ok(Token::Object(PdfObject::Name(self.name()))),
            b'(' => Ok(Token::Object(PdfObject::String(self.literal_string()?))),
            b'<' if self.cur.peek_n(1) == Some(b'<') => {
                self.cur.pos += 2;
                Ok(Token::Object(PdfObject::Dictionary(self.dictionary(depth + 1)?)))
            }
            b'<' => Ok(Token::Object(PdfObject::String(self.hex_string()?))),
            b'>' if self.cur.peek_n(1) == Some(b'>') => {
                self.cur.pos += 2;
                Ok(Token::DictEnd)
            }
            b'[' => {
                self.cur.pos += 1;
                Ok(Token::Object(PdfObject::Array(self.array(depth + 1)?)))
            }
            b']' => {
                self.cur.pos += 1;
                Ok(Token::ArrayEnd)
            }
            b'{' | b'}' | b')' | b'>' => {
                self.cur.pos += 1;
                Ok(Token::Keyword(vec![b]))
            }
            _ => {
                let raw = self.cur.read_token();
                Ok(classify_regular(raw))
            }
        }
    }

    /// Parse one operand-position object; keywords become literals.
    fn object(&mut self, depth: usize) -> DocResult<Option<PdfObject>> {
        self.cur.skip_ws_and_comments();
        match self.next_token(depth)? {
            Token::Object(obj) => Ok(Some(obj)),
            Token::Keyword(kw) => Ok(Some(PdfObject::Literal(kw))),
            Token::ArrayEnd | Token::DictEnd => Ok(None),
        }
    }

    fn array(&mut self, depth: usize) -> DocResult<Vec<PdfObject>> {
        let mut items = Vec::new();
        loop {
            self.cur.skip_ws_and_comments();
            if self.cur.eof() {
                return Err(self.error("unterminated array"));
            }
            if self.cur.peek() == Some(b']') {
                self.cur.pos += 1;
                return Ok(items);
            }
            match self.object(depth)? {
                Some(obj) => items.push(obj),
                None => return Err(self.error("unbalanced '>>' in array")),
            }
        }
    }

    fn dictionary(&mut self, depth: usize) -> DocResult<PdfDict> {
        let mut dict = PdfDict::new();
        loop {
            self.cur.skip_ws_and_comments();
            if self.cur.eof() {
                return Err(self.error("unterminated dictionary"));
            }
            if self.cur.peek() == Some(b'>') && self.cur.peek_n(1) == Some(b'>') {
                self.cur.pos += 2;
                return Ok(dict);
            }
            if self.cur.peek() != Some(b'/') {
                return Err(self.error("dictionary key is not a name"));
            }
            let key = self.name();
            let Some(value) = self.object(depth)? else {
                return Err(self.error("dictionary key without a value"));
            };
            dict.insert(key, value);
        }
    }

    fn name(&mut self) -> PdfName {
        self.cur.pos += 1;
        let raw = self.cur.read_token();
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' {
                if let (Some(h), Some(l)) = (
                    raw.get(i + 1).copied().and_then(hex_val),
                    raw.get(i + 2).copied().and_then(hex_val),
                ) {
                    out.push((h << 4) | l);
                    i += 3;
                    continue;
                }
            }
            out.push(raw[i]);
            i += 1;
        }
        PdfName::new(out)
    }

    fn literal_string(&mut self) -> DocResult<PdfString> {
        self.cur.pos += 1;
        let mut depth = 1usize;
        let mut out = Vec::new();
        loop {
            let Some(b) = self.cur.consume() else {
                return Err(self.error("unterminated string"));
            };
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(PdfString::literal(out));
                    }
                    out.push(b);
                }
                b'\\' => self.string_escape(&mut out),
                _ => out.push(b),
            }
        }
    }

    fn string_escape(&mut self, out: &mut Vec<u8>) {
        let Some(e) = self.cur.consume() else {
            return;
        };
        match e {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'\r' => {
                if self.cur.peek() == Some(b'\n') {
                    self.cur.pos += 1;
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = (e - b'0') as u32;
                for _ in 0..2 {
                    match self.cur.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + (d - b'0') as u32;
                            self.cur.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xff) as u8);
            }
            other => out.push(other),
        }
    }

    fn hex_string(&mut self) -> DocResult<PdfString> {
        self.cur.pos += 1;
        let mut digits = Vec::new();
        loop {
            match self.cur.consume() {
                Some(b'>') => break,
                Some(b) if is_whitespace(b) => {}
                Some(b) => match hex_val(b) {
                    Some(v) => digits.push(v),
                    None => return Err(self.error("invalid hex string")),
                },
                None => return Err(self.error("unterminated hex string")),
            }
        }
        let bytes = digits
            .chunks(2)
            .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
            .collect::<Vec<u8>>();
        Ok(PdfString::hex(bytes))
    }

    fn inline_image(&mut self, scope: Option<&ResourceScope<'_>>) -> DocResult<InlineImage> {
        let mut dict = PdfDict::new();
        loop {
            self.cur.skip_ws_and_comments();
            if self.cur.eof() {
                return Err(self.error("inline image without ID"));
            }
            if self.cur.consume_keyword(b"ID") {
                break;
            }
            if self.cur.peek() != Some(b'/') {
                return Err(self.error("inline image key is not a name"));
            }
            let key = expand_key(self.name());
            let Some(value) = self.object(0)? else {
                return Err(self.error("inline image key without a value"));
            };
            let value = if key.is("ColorSpace") || key.is("Filter") {
                expand_value(value)
            } else {
                value
            };
            dict.insert(key, value);
        }
        // A single whitespace byte separates ID from the samples.
        if self.cur.peek().is_some_and(is_whitespace) {
            self.cur.pos += 1;
        }
        let samples = match sample_length(&dict, scope) {
            Some(len) if len <= self.cur.bytes.len() - self.cur.pos => {
                let start = self.cur.pos;
                self.cur.pos += len;
                self.cur.skip_ws_and_comments();
                if !self.cur.consume_keyword(b"EI") {
                    return Err(self.error("inline image data not followed by EI"));
                }
                self.cur.bytes[start..start + len].to_vec()
            }
            _ => self.scan_to_end_marker()?,
        };
        debug!(samples = samples.len(), "inline image parsed");
        Ok(InlineImage { dict, samples })
    }

    fn scan_to_end_marker(&mut self) -> DocResult<Vec<u8>> {
        let bytes = self.cur.bytes;
        let start = self.cur.pos;
        let mut i = start;
        while i + 2 <= bytes.len() {
            let at_marker = &bytes[i..i + 2] == b"EI"
                && (i == start || is_whitespace(bytes[i - 1]))
                && bytes.get(i + 2).map_or(true, |&b| is_whitespace(b) || is_delim(b));
            if at_marker {
                let end = if i > start { i - 1 } else { i };
                self.cur.pos = i + 2;
                return Ok(bytes[start..end].to_vec());
            }
            i += 1;
        }
        Err(self.error("inline image without EI"))
    }
}

fn classify_regular(raw: &[u8]) -> Token {
    match raw {
        b"true" => Token::Object(PdfObject::Boolean(true)),
        b"false" => Token::Object(PdfObject::Boolean(false)),
        b"null" => Token::Object(PdfObject::Null),
        _ => match parse_number(raw) {
            Some(n) => Token::Object(PdfObject::Number(n)),
            None => Token::Keyword(raw.to_vec()),
        },
    }
}

fn parse_number(raw: &[u8]) -> Option<f64> {
    let first = *raw.first()?;
    if !(first.is_ascii_digit() || matches!(first, b'+' | b'-' | b'.')) {
        return None;
    }
    if !raw.iter().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.')) {
        return None;
    }
    std::str::from_utf8(raw).ok()?.parse::<f64>().ok()
}

fn expand_key(key: PdfName) -> PdfName {
    let full = match key.as_bytes() {
        b"BPC" => "BitsPerComponent",
        b"CS" => "ColorSpace",
        b"D" => "Decode",
        b"DP" => "DecodeParms",
        b"F" => "Filter",
        b"H" => "Height",
        b"W" => "Width",
        b"IM" => "ImageMask",
        b"I" => "Interpolate",
        b"L" => "Length",
        _ => return key,
    };
    PdfName::from(full)
}

fn expand_value(value: PdfObject) -> PdfObject {
    match value {
        PdfObject::Name(name) => {
            let full = match name.as_bytes() {
                b"G" => "DeviceGray",
                b"RGB" => "DeviceRGB",
                b"CMYK" => "DeviceCMYK",
                b"I" => "Indexed",
                b"AHx" => "ASCIIHexDecode",
                b"A85" => "ASCII85Decode",
                b"LZW" => "LZWDecode",
                b"Fl" => "FlateDecode",
                b"RL" => "RunLengthDecode",
                b"CCF" => "CCITTFaxDecode",
                b"DCT" => "DCTDecode",
                _ => return PdfObject::Name(name),
            };
            PdfObject::name(full)
        }
        PdfObject::Array(items) => PdfObject::Array(items.into_iter().map(expand_value).collect()),
        other => other,
    }
}

/// Byte length of unfiltered inline image samples, when it can be computed.
fn sample_length(dict: &PdfDict, scope: Option<&ResourceScope<'_>>) -> Option<usize> {
    if dict.contains_key("Filter") {
        return None;
    }
    let width = dict.get("Width")?.as_number()?;
    let height = dict.get("Height")?.as_number()?;
    let image_mask = matches!(dict.get("ImageMask"), Some(PdfObject::Boolean(true)));
    let (bpc, components) = if image_mask {
        (1.0, 1)
    } else {
        let bpc = dict.get("BitsPerComponent")?.as_number()?;
        (bpc, color_components(dict.get("ColorSpace")?, scope, 0)?)
    };
    if width < 0.0 || height < 0.0 || bpc <= 0.0 {
        return None;
    }
    let bits_per_row = (width as usize).checked_mul(bpc as usize)?.checked_mul(components)?;
    bits_per_row.div_ceil(8).checked_mul(height as usize)
}

fn color_components(cs: &PdfObject, scope: Option<&ResourceScope<'_>>, depth: usize) -> Option<usize> {
    if depth > 4 {
        return None;
    }
    match cs {
        PdfObject::Name(name) => match name.as_bytes() {
            b"DeviceGray" | b"CalGray" | b"Indexed" | b"Separation" | b"Pattern" => Some(1),
            b"DeviceRGB" | b"CalRGB" | b"Lab" => Some(3),
            b"DeviceCMYK" => Some(4),
            _ => {
                let scope = scope?;
                color_components(scope.named_color_space(name)?, Some(scope), depth + 1)
            }
        },
        PdfObject::Array(items) => {
            let family = items.first()?.as_name()?;
            match family.as_bytes() {
                b"Indexed" | b"I" | b"Separation" | b"CalGray" => Some(1),
                b"CalRGB" | b"Lab" => Some(3),
                b"DeviceN" => {
                    let names = items.get(1)?;
                    let names = match scope {
                        Some(s) => s.doc.resolve(names)?,
                        None => names,
                    };
                    Some(names.as_array()?.len())
                }
                b"ICCBased" => {
                    let scope = scope?;
                    let profile = scope.doc.resolve_dict(items.get(1)?)?;
                    let n = profile.get("N")?.as_number()?;
                    Some(n as usize)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Decoded bytes of a page's `/Contents` entry.
///
/// A single stream is decoded as is; an array of streams is decoded part by
/// part and joined with a newline so tokens never fuse across the boundary.
/// An absent entry yields no bytes.
pub fn content_bytes<D: Document + ?Sized>(doc: &D, contents: &PdfObject) -> DocResult<Vec<u8>> {
    match doc.resolve(contents) {
        None => Ok(Vec::new()),
        Some(PdfObject::Stream(stream)) => decode_stream(stream),
        Some(PdfObject::Array(parts)) => {
            let mut out = Vec::new();
            for (i, part) in parts.iter().enumerate() {
                let Some(resolved) = doc.resolve(part) else {
                    continue;
                };
                let PdfObject::Stream(stream) = resolved else {
                    return Err(DocError::NotAContentStream(resolved.kind()));
                };
                if i > 0 {
                    out.push(b'\n');
                }
                out.extend_from_slice(&decode_stream(stream)?);
            }
            Ok(out)
        }
        Some(other) => Err(DocError::NotAContentStream(other.kind())),
    }
}
