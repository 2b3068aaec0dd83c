use crate::editing::IssueId;
use crate::models::Span;

/// Result of applying a replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// The issue whose span was rewritten
    pub issue: IssueId,
    /// Range now holding the replacement text, in post-edit offsets
    pub changed: Span,
    /// Change in buffer length
    pub delta: isize,
    pub version: u64,
}
