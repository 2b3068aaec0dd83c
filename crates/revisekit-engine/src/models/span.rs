use serde::{Deserialize, Serialize};

/// A char range `[start, end)` into the buffer.
///
/// Offsets count Unicode scalar values, not bytes, so a span over CJK text
/// lines up with what the analysis service reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in chars. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True when `start <= end <= len`.
    #[must_use]
    pub fn fits_within(self, len: usize) -> bool {
        self.start <= self.end && self.end <= len
    }

    /// Move this span to account for an edit at `after_pos` that changed the
    /// buffer length by `delta`.
    ///
    /// Spans starting after the pivot move wholesale. Spans straddling the
    /// pivot only move their end. No boundary is moved below the pivot.
    #[must_use]
    pub fn shifted(self, after_pos: usize, delta: isize) -> Self {
        let apply = |pos: usize| pos.saturating_add_signed(delta).max(after_pos);
        if self.start > after_pos {
            Span::new(apply(self.start), apply(self.end))
        } else if self.end > after_pos {
            Span::new(self.start, apply(self.end))
        } else {
            self
        }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
