pub mod editing;
pub mod models;

// Re-export key types for easier usage
pub use editing::{
    Buffer, EngineError, Issue, IssueId, IssueKind, IssueState, KindFilter, Patch,
    ReplacementOption, Resolution, RevisionEngine, RiskLevel, SpanStore, SpanViolation,
    TrackedIssue, revision::BatchReport,
};
pub use models::{Scores, Span};
