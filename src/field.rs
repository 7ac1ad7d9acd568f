//! Growable field buffer with single-mark rollback.
//!
//! The parser appends characters here and marks the buffer before a
//! lookahead it may have to undo, e.g. the first character of a
//! multi-character record separator. Rolling back to a single mark restores
//! the content before the lookahead. Two marks at different positions make
//! the rollback target ambiguous, so the buffer is cleared instead.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Unset,
    At(usize),
    Ambiguous,
}

/// Character buffer for the field being read.
///
/// # Examples
///
/// ```rust
/// use serde_dsv::FieldBuilder;
///
/// let mut field = FieldBuilder::new();
/// field.push_str("ab");
/// field.mark();
/// field.push_str("\r");
/// field.rollback();
/// assert_eq!(field.as_str(), "ab");
/// ```
#[derive(Clone, Debug)]
pub struct FieldBuilder {
    buf: String,
    mark: Mark,
}

impl Default for FieldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldBuilder {
    #[must_use]
    pub fn new() -> Self {
        FieldBuilder {
            buf: String::with_capacity(64),
            mark: Mark::Unset,
        }
    }

    #[inline]
    pub fn push(&mut self, ch: char) {
        self.buf.push(ch);
    }

    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Records the current length as rollback target.
    ///
    /// Marking again at the same length keeps the mark; marking at a
    /// different length makes it ambiguous.
    pub fn mark(&mut self) {
        let len = self.buf.len();
        self.mark = match self.mark {
            Mark::Unset => Mark::At(len),
            Mark::At(pos) if pos == len => Mark::At(pos),
            Mark::At(_) | Mark::Ambiguous => Mark::Ambiguous,
        };
    }

    /// Returns `true` while a mark is set.
    #[inline]
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.mark != Mark::Unset
    }

    /// Keeps everything appended since the mark and drops the mark.
    pub fn commit(&mut self) {
        self.mark = Mark::Unset;
    }

    /// Truncates to the mark, or clears the buffer if the mark is ambiguous.
    /// Without a mark this is a no-op.
    pub fn rollback(&mut self) {
        match self.mark {
            Mark::Unset => {}
            Mark::At(pos) => self.buf.truncate(pos),
            Mark::Ambiguous => self.buf.clear(),
        }
        self.mark = Mark::Unset;
    }

    /// Empties the buffer and drops any mark, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.mark = Mark::Unset;
    }

    /// Moves the content out and resets the builder.
    pub fn take(&mut self) -> String {
        self.mark = Mark::Unset;
        let capacity = self.buf.capacity().max(64);
        std::mem::replace(&mut self.buf, String::with_capacity(capacity))
    }
}
