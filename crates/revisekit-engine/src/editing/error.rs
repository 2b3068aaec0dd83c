use crate::editing::IssueId;
use crate::models::Span;

/// Why an issue set was rejected on load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanViolation {
    #[error("issue {id} span {span} does not fit a buffer of {buffer_len} chars")]
    OutOfBounds {
        id: IssueId,
        span: Span,
        buffer_len: usize,
    },
    #[error("issue id {0} appears more than once")]
    DuplicateId(IssueId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid span: {0}")]
    InvalidSpan(#[from] SpanViolation),
    #[error("Issue not found: {0}")]
    NotFound(IssueId),
    #[error("Issue already resolved: {0}")]
    AlreadyResolved(IssueId),
    /// Offsets no longer match the buffer. Only a broken span store can
    /// produce this.
    #[error("Range {start}..{end} is outside a buffer of {len} chars")]
    Range { start: usize, end: usize, len: usize },
}

impl EngineError {
    /// Lookup and state errors the caller can handle by picking another issue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound(_) | EngineError::AlreadyResolved(_)
        )
    }

    /// Invariant violations that indicate a bug rather than bad input
    pub fn is_defect(&self) -> bool {
        matches!(self, EngineError::Range { .. })
    }
}
