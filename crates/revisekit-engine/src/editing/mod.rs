/*!
 * # Revision Core Module
 *
 * Holds the issues reported by the analysis service over a mutable text
 * buffer and keeps every issue's offsets correct while the user resolves
 * them one at a time or in batches.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The text lives in one **`xi_rope::Rope`** owned by [`Buffer`]
 * - Callers never write to it directly; every edit goes through
 *   [`RevisionEngine`], which returns a [`Patch`]
 * - Offsets are char offsets; byte translation stays inside the buffer
 *
 * ### 2. Span Store
 * - [`SpanStore`] owns the issue set of the current analysis pass
 * - Resolution is a field on each [`TrackedIssue`], so an id is either open
 *   or resolved and never both
 * - After an edit, `shift` moves every later span by the edit's length delta,
 *   computed against pre-edit offsets in a single pass
 *
 * ### 3. Batch Application
 * - Batches are applied **rightmost first**, so an edit never disturbs the
 *   offsets of an issue that has not been processed yet
 * - Every span is validated before the first edit, so a batch either runs to
 *   completion or leaves the buffer untouched
 *
 * ## Module Structure
 *
 * - **`issue`**: `Issue`, `IssueKind`, `RiskLevel` and candidate selection
 * - **`span_store`**: ordered issue set with resolution state and `shift`
 * - **`buffer`**: rope-backed text with validated substring replacement
 * - **`revision`**: `RevisionEngine` state machine (select/replace/ignore/batch)
 * - **`patch`**: edit result metadata (changed range, delta, version)
 * - **`error`**: `EngineError` taxonomy
 *
 * ## Usage Pattern
 *
 * ```rust
 * use revisekit_engine::{Issue, IssueKind, KindFilter, RevisionEngine, Span};
 *
 * let mut engine = RevisionEngine::new();
 * let issue = Issue::new("i1", IssueKind::HomophoneWord, Span::new(2, 4))
 *     .with_suggestions(["优秀", "出色"]);
 * engine.load_analysis("这个产品太棒了", vec![issue], 70).unwrap();
 *
 * let report = engine.apply_batch(&KindFilter::Only(IssueKind::HomophoneWord)).unwrap();
 * assert_eq!(report.applied.len(), 1);
 * assert_eq!(engine.text(), "这个优秀太棒了");
 * ```
 */

pub mod buffer;
pub mod error;
pub mod issue;
pub mod patch;
pub mod revision;
pub mod span_store;

// Public API re-exports
pub use buffer::Buffer;
pub use error::{EngineError, SpanViolation};
pub use issue::{
    Issue, IssueId, IssueKind, IssueState, KindFilter, ReplacementOption, Resolution, RiskLevel,
    TrackedIssue,
};
pub use patch::Patch;
pub use revision::RevisionEngine;
pub use span_store::SpanStore;
