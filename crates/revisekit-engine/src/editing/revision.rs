use crate::editing::{
    Buffer, EngineError, Issue, IssueId, KindFilter, Patch, Resolution, SpanStore, TrackedIssue,
};
use crate::models::{Scores, Span};

/// Outcome of [`RevisionEngine::apply_batch`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Issues replaced, in the order they were applied (rightmost first)
    pub applied: Vec<IssueId>,
    /// Matching issues left open because they had no candidate
    pub skipped: Vec<IssueId>,
    pub patches: Vec<Patch>,
}

/// Owns the buffer and the issue set for one piece of content.
///
/// All edits go through here so that the span store is shifted in the same
/// step as the buffer. Every buffer mutation bumps [`RevisionEngine::version`].
///
/// ## Issue lifecycle
///
/// `Open -> Resolved` is one-way, except through
/// [`RevisionEngine::reset_resolutions`]. Selection is an overlay on open
/// issues and is dropped when the selected issue is resolved.
#[derive(Debug, Clone, Default)]
pub struct RevisionEngine {
    buffer: Buffer,
    store: SpanStore,
    scores: Scores,
    version: u64,
}

impl RevisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing text with no issues
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: Buffer::from_text(text),
            ..Self::default()
        }
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn store(&self) -> &SpanStore {
        &self.store
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selected(&self) -> Option<&IssueId> {
        self.store.selected()
    }

    pub fn issue(&self, id: &IssueId) -> Result<&TrackedIssue, EngineError> {
        self.store.get(id)
    }

    /// Replace the buffer with freshly analysed text and its issues.
    ///
    /// The issues are validated against `text` before anything changes, so
    /// a rejected pass leaves the previous text, issues and scores intact.
    pub fn load_analysis(
        &mut self,
        text: &str,
        issues: Vec<Issue>,
        score_before: i32,
    ) -> Result<(), EngineError> {
        let buffer = Buffer::from_text(text);
        let count = issues.len();
        self.store.load(issues, buffer.len())?;
        self.buffer = buffer;
        self.scores.before = score_before;
        self.version += 1;
        log::debug!(
            "Loaded {count} issues over {} chars (score {score_before}, version {})",
            self.buffer.len(),
            self.version
        );
        Ok(())
    }

    /// Replace the issue set for the current buffer
    pub fn load_issues(&mut self, issues: Vec<Issue>) -> Result<(), EngineError> {
        self.store.load(issues, self.buffer.len())
    }

    pub fn select_issue(&mut self, id: &IssueId) -> Result<(), EngineError> {
        self.store.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Rewrite an open issue's span with `replacement` and resolve it.
    ///
    /// Later spans are shifted using the issue's pre-edit start as the
    /// pivot. Lookup failures leave everything untouched, and so does a
    /// range failure, which can only mean the span store is corrupt.
    pub fn replace_issue(&mut self, id: &IssueId, replacement: &str) -> Result<Patch, EngineError> {
        let span = self.store.open_issue(id)?.span();

        let delta = self
            .buffer
            .replace(span.start, span.end, replacement)
            .inspect_err(|err| {
                log::error!("Span store out of step with buffer for issue {id}: {err}");
            })?;
        self.store.shift(span.start, delta);
        self.store
            .resolve(id, Resolution::Replaced(replacement.to_string()))?;
        self.version += 1;

        log::debug!("Replaced issue {id} at {span} (delta {delta})");

        Ok(Patch {
            issue: id.clone(),
            changed: Span::new(span.start, span.start + replacement.chars().count()),
            delta,
            version: self.version,
        })
    }

    /// Resolve an issue without touching the buffer. Ignoring an issue that
    /// is already resolved is a no-op.
    pub fn ignore_issue(&mut self, id: &IssueId) -> Result<(), EngineError> {
        if self.store.resolve(id, Resolution::Ignored)? {
            log::debug!("Ignored issue {id}");
        }
        Ok(())
    }

    /// Replace every open issue matching `filter` with its preferred candidate.
    ///
    /// Issues are applied in descending start order so an edit never moves an
    /// issue that is still waiting to be applied. All spans are checked up
    /// front; if any is out of range nothing is applied.
    pub fn apply_batch(&mut self, filter: &KindFilter) -> Result<BatchReport, EngineError> {
        self.store
            .check_bounds(self.buffer.len())
            .inspect_err(|err| log::error!("Refusing batch over corrupt spans: {err}"))?;

        let mut plan: Vec<(IssueId, usize, Option<String>)> = self
            .store
            .open()
            .filter(|tracked| filter.matches(tracked.issue().kind))
            .map(|tracked| {
                (
                    tracked.id().clone(),
                    tracked.span().start,
                    tracked.issue().preferred_replacement().map(str::to_owned),
                )
            })
            .collect();
        plan.sort_by(|a, b| b.1.cmp(&a.1));

        let mut report = BatchReport::default();
        for (id, _, candidate) in plan {
            match candidate {
                Some(replacement) => {
                    let patch = self.replace_issue(&id, &replacement)?;
                    report.patches.push(patch);
                    report.applied.push(id);
                }
                None => report.skipped.push(id),
            }
        }

        log::debug!(
            "Batch applied {} issues, skipped {}",
            report.applied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Reopen every resolved issue and clear the selection.
    ///
    /// Buffer text is not rolled back; spans of replaced issues now cover
    /// their replacement text.
    pub fn reset_resolutions(&mut self) {
        self.store.reset_resolutions();
    }

    /// Swap in optimized text from the optimization service.
    ///
    /// The issues described the old text, so the store is emptied.
    pub fn apply_optimized(&mut self, text: &str, score_after: i32) {
        self.buffer.set_text(text);
        self.store.clear();
        self.scores.after = score_after;
        self.version += 1;
        log::debug!("Applied optimized text (score {score_after}, version {})", self.version);
    }

    /// Drop the text, the issues and both scores
    pub fn clear(&mut self) {
        self.buffer.set_text("");
        self.store.clear();
        self.scores = Scores::default();
        self.version += 1;
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut SpanStore {
        &mut self.store
    }
}
