//! Lexical cursor over expression text.
//!
//! The evaluator works directly on the input bytes: each grammar level
//! inspects the byte under the cursor, consumes what it recognizes, and
//! leaves the cursor on the first unconsumed byte. There is no token
//! stream. The cursor never steps backward on its own; the assignment
//! level rewinds explicitly via [`Cursor::pos`]/[`Cursor::set_pos`]
//! when a leading identifier turns out not to be an assignment target.

/// A position-tracking cursor over an immutable input string.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Input bytes.
    src: &'a [u8],
    /// Current byte position, clamped to `src.len()`.
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `source`.
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
        }
    }

    /// Current byte position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Move to an explicit position (clamped to end of input).
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    /// Whether the cursor has reached end of input.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// The byte under the cursor, if any.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// The byte `offset` positions ahead of the cursor, if any.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    /// Advance one byte.
    pub fn bump(&mut self) {
        self.advance(1);
    }

    /// Advance `n` bytes (clamped to end of input).
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.src.len());
    }

    /// Whether the input at the cursor starts with `s`.
    #[must_use]
    pub fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s.as_bytes())
    }

    /// Skip spaces, tabs, newlines, and form feeds. Idempotent; never
    /// advances past end of input.
    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, b' ' | b'\t' | b'\n' | 0x0C) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Read a C identifier (alpha or `_`, then alphanumeric or `_`).
    ///
    /// Returns `None` without moving if the cursor is not on the start
    /// of an identifier.
    pub fn read_name(&mut self) -> Option<String> {
        let c = self.peek()?;
        if !c.is_ascii_alphabetic() && c != b'_' {
            return None;
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(self.slice(start, self.pos).to_owned())
    }

    /// The input between two byte positions (clamped; empty on any
    /// out-of-range or non-UTF-8 slice, which cannot happen for ranges
    /// bounded by ASCII delimiters).
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.src.len());
        let start = start.min(end);
        std::str::from_utf8(&self.src[start..end]).unwrap_or("")
    }

    /// The unconsumed remainder of the input (for error messages).
    #[must_use]
    pub fn rest(&self) -> &'a str {
        self.slice(self.pos, self.src.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
