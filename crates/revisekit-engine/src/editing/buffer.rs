use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::editing::EngineError;

/// The text under revision.
///
/// Stored in an xi-rope buffer, addressed in chars. Every replacement is
/// compiled into a rope `Delta` and applied in one step.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    /// Cached char count, kept in step with every edit
    char_len: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("text", &self.text())
            .field("char_len", &self.char_len)
            .finish()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
            char_len: text.chars().count(),
        }
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Copy out the chars in `range`
    pub fn slice(&self, range: Range<usize>) -> Result<String, EngineError> {
        self.check_range(range.start, range.end)?;
        let bytes = self.byte_range(range.start, range.end);
        Ok(self.rope.slice_to_cow(bytes).into_owned())
    }

    /// Replace `[start, end)` with `text`.
    ///
    /// Returns the signed change in length, `chars(text) - (end - start)`.
    /// On a bad range nothing is modified.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<isize, EngineError> {
        self.check_range(start, end)?;

        let bytes = self.byte_range(start, end);
        let mut builder = Builder::new(self.rope.len());
        if text.is_empty() {
            builder.delete(bytes);
        } else {
            builder.replace(bytes, Rope::from(text));
        }
        let delta = builder.build();
        self.rope = delta.apply(&self.rope);

        let inserted = text.chars().count();
        self.char_len = self.char_len - (end - start) + inserted;

        Ok(inserted as isize - (end - start) as isize)
    }

    /// Swap in entirely new content
    pub(crate) fn set_text(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EngineError> {
        if start <= end && end <= self.char_len {
            Ok(())
        } else {
            Err(EngineError::Range {
                start,
                end,
                len: self.char_len,
            })
        }
    }

    /// Translate a checked char range into rope byte offsets
    fn byte_range(&self, start: usize, end: usize) -> Range<usize> {
        let start_byte = self.byte_offset(0, start);
        start_byte..self.byte_offset(start_byte, end - start)
    }

    /// Byte offset `chars` chars past byte `from`, walking only the chunks
    /// in between
    fn byte_offset(&self, from: usize, chars: usize) -> usize {
        let mut remaining = chars;
        let mut byte = from;
        for chunk in self.rope.iter_chunks(from..self.rope.len()) {
            match chunk.char_indices().nth(remaining) {
                Some((offset, _)) => return byte + offset,
                None => {
                    remaining -= chunk.chars().count();
                    byte += chunk.len();
                }
            }
        }
        byte
    }
}
