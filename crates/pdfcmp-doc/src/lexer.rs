#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    pub bytes: &'a [u8],
    pub pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn peek_n(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    pub fn consume(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Consume bytes while `f` holds and return them.
    pub fn consume_while<F: Fn(u8) -> bool>(&mut self, f: F) -> &'a [u8] {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !f(b) {
                break;
            }
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }

    pub fn skip_ws_and_comments(&mut self) {
        loop {
            self.consume_while(is_whitespace);
            if self.peek() != Some(b'%') {
                break;
            }
            while let Some(b) = self.consume() {
                if b == b'\n' || b == b'\r' {
                    break;
                }
            }
        }
    }

    /// Consume `kw` if it appears at the cursor as a whole token.
    pub fn consume_keyword(&mut self, kw: &[u8]) -> bool {
        let end = self.pos + kw.len();
        if self.bytes.get(self.pos..end) != Some(kw) {
            return false;
        }
        if self.bytes.get(end).is_some_and(|&b| !is_whitespace(b) && !is_delim(b)) {
            return false;
        }
        self.pos = end;
        true
    }

    /// Read a regular-character token (a keyword or a number).
    pub fn read_token(&mut self) -> &'a [u8] {
        self.consume_while(|b| !is_whitespace(b) && !is_delim(b))
    }
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\x00' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

pub(crate) fn is_delim(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}
