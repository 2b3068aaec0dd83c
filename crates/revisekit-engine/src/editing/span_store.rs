use std::collections::HashSet;

use crate::editing::{
    EngineError, Issue, IssueId, IssueState, Resolution, SpanViolation, TrackedIssue,
};

/// The issue set of the current analysis pass.
///
/// Issues are kept in the order they were loaded; [`SpanStore::all`] yields
/// them by ascending start offset. Resolution lives on each
/// [`TrackedIssue`] and selection is a single optional id, both reset
/// whenever a new set is loaded.
#[derive(Debug, Clone, Default)]
pub struct SpanStore {
    issues: Vec<TrackedIssue>,
    selected: Option<IssueId>,
}

impl SpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole issue set.
    ///
    /// Every span must satisfy `start <= end <= buffer_len` and ids must be
    /// unique. On failure the previous set is kept as it was.
    pub fn load(&mut self, issues: Vec<Issue>, buffer_len: usize) -> Result<(), EngineError> {
        let mut seen = HashSet::with_capacity(issues.len());
        for issue in &issues {
            if !issue.span.fits_within(buffer_len) {
                return Err(SpanViolation::OutOfBounds {
                    id: issue.id.clone(),
                    span: issue.span,
                    buffer_len,
                }
                .into());
            }
            if !seen.insert(&issue.id) {
                return Err(SpanViolation::DuplicateId(issue.id.clone()).into());
            }
        }

        self.issues = issues.into_iter().map(TrackedIssue::new).collect();
        self.selected = None;
        Ok(())
    }

    pub fn get(&self, id: &IssueId) -> Result<&TrackedIssue, EngineError> {
        self.issues
            .iter()
            .find(|tracked| tracked.id() == id)
            .ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    /// All issues, open and resolved, by ascending start offset.
    ///
    /// Ties keep load order. The iterator borrows the store, so take a
    /// [`SpanStore::snapshot`] if the issues are needed across a mutation.
    pub fn all(&self) -> impl Iterator<Item = &TrackedIssue> + '_ {
        let mut order: Vec<usize> = (0..self.issues.len()).collect();
        order.sort_by_key(|&index| self.issues[index].span().start);
        order.into_iter().map(move |index| &self.issues[index])
    }

    /// Open issues only, by ascending start offset
    pub fn open(&self) -> impl Iterator<Item = &TrackedIssue> + '_ {
        self.all().filter(|tracked| tracked.is_open())
    }

    /// Owned copy of every issue in [`SpanStore::all`] order
    pub fn snapshot(&self) -> Vec<Issue> {
        self.all().map(|tracked| tracked.issue().clone()).collect()
    }

    /// Move spans after an edit at `after_pos` that changed the buffer length
    /// by `delta`.
    ///
    /// Each issue is tested against its own offsets only, so the result does
    /// not depend on traversal order. Spans starting after `after_pos` move by
    /// `delta`; spans straddling it stretch or shrink at the end.
    pub fn shift(&mut self, after_pos: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for tracked in &mut self.issues {
            tracked.issue.span = tracked.issue.span.shifted(after_pos, delta);
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.issues.iter().filter(|tracked| tracked.is_open()).count()
    }

    pub fn resolved_ids(&self) -> impl Iterator<Item = &IssueId> + '_ {
        self.issues
            .iter()
            .filter(|tracked| tracked.is_resolved())
            .map(TrackedIssue::id)
    }

    pub fn selected(&self) -> Option<&IssueId> {
        self.selected.as_ref()
    }

    /// Check every span against the buffer length
    pub fn check_bounds(&self, buffer_len: usize) -> Result<(), EngineError> {
        match self
            .issues
            .iter()
            .find(|tracked| !tracked.span().fits_within(buffer_len))
        {
            Some(tracked) => Err(EngineError::Range {
                start: tracked.span().start,
                end: tracked.span().end,
                len: buffer_len,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn open_issue(&self, id: &IssueId) -> Result<&TrackedIssue, EngineError> {
        let tracked = self.get(id)?;
        if tracked.is_resolved() {
            return Err(EngineError::AlreadyResolved(id.clone()));
        }
        Ok(tracked)
    }

    pub(crate) fn select(&mut self, id: &IssueId) -> Result<(), EngineError> {
        self.open_issue(id)?;
        self.selected = Some(id.clone());
        Ok(())
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Mark an open issue resolved and drop it from the selection.
    /// Returns false if it was already resolved.
    pub(crate) fn resolve(
        &mut self,
        id: &IssueId,
        resolution: Resolution,
    ) -> Result<bool, EngineError> {
        let tracked = self
            .issues
            .iter_mut()
            .find(|tracked| tracked.id() == id)
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if tracked.is_resolved() {
            return Ok(false);
        }
        tracked.state = IssueState::Resolved(resolution);
        Ok(true)
    }

    pub(crate) fn reset_resolutions(&mut self) {
        for tracked in &mut self.issues {
            tracked.state = IssueState::Open;
        }
        self.selected = None;
    }

    pub(crate) fn clear(&mut self) {
        self.issues.clear();
        self.selected = None;
    }

    #[cfg(test)]
    pub(crate) fn corrupt_span(&mut self, id: &IssueId, span: crate::models::Span) {
        if let Some(tracked) = self.issues.iter_mut().find(|tracked| tracked.id() == id) {
            tracked.issue.span = span;
        }
    }
}
