use serde::{Deserialize, Serialize};

use crate::models::Span;

/// Identifier of an issue, unique within one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IssueId {
    fn from(id: &str) -> Self {
        IssueId(id.to_string())
    }
}

impl From<String> for IssueId {
    fn from(id: String) -> Self {
        IssueId(id)
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category tag of a flagged span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ProhibitedWord,
    ProhibitedWordVariation,
    HomophoneWord,
    Style,
    /// Any category this client does not know about yet
    #[serde(other)]
    Other,
}

/// Ordinal severity, `Low < Medium < High`.
///
/// Encoded on the wire as 1, 2 and 3; anything above 3 is treated as high
/// and anything below 2 as low.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl From<u8> for RiskLevel {
    fn from(level: u8) -> Self {
        match level {
            0 | 1 => RiskLevel::Low,
            2 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }
}

/// A ranked replacement candidate, used when an issue has no plain suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementOption {
    pub replacement: String,
    #[serde(default, rename = "type")]
    pub option_type: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub priority: i32,
}

/// One flagged span with its candidate fixes.
///
/// Everything except `span` is descriptive metadata fixed at analysis time.
/// The span itself is only ever moved by the span store.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: IssueId,
    pub kind: IssueKind,
    pub span: Span,
    pub word: String,
    pub risk_level: RiskLevel,
    /// Most preferred first
    pub suggestions: Vec<String>,
    pub replacement_options: Option<Vec<ReplacementOption>>,
    pub context: String,
    pub confidence: f64,
    pub category: String,
    pub reason: String,
}

impl Issue {
    pub fn new(id: impl Into<IssueId>, kind: IssueKind, span: Span) -> Self {
        Self {
            id: id.into(),
            kind,
            span,
            word: String::new(),
            risk_level: RiskLevel::default(),
            suggestions: Vec::new(),
            replacement_options: None,
            context: String::new(),
            confidence: 0.0,
            category: String::new(),
            reason: String::new(),
        }
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_replacement_options(mut self, options: Vec<ReplacementOption>) -> Self {
        self.replacement_options = Some(options);
        self
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn start_pos(&self) -> usize {
        self.span.start
    }

    pub fn end_pos(&self) -> usize {
        self.span.end
    }

    /// The candidate a batch apply would use.
    ///
    /// `suggestions[0]` when present, otherwise the replacement option with
    /// the highest priority. Ties go to the option listed first.
    pub fn preferred_replacement(&self) -> Option<&str> {
        if let Some(first) = self.suggestions.first() {
            return Some(first.as_str());
        }
        self.replacement_options
            .as_deref()?
            .iter()
            .reduce(|best, current| {
                if current.priority > best.priority {
                    current
                } else {
                    best
                }
            })
            .map(|option| option.replacement.as_str())
    }
}

/// How a resolved issue was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The span was rewritten with this text
    Replaced(String),
    Ignored,
}

/// Lifecycle of an issue within one pass. `Resolved` is terminal until the
/// resolutions are reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IssueState {
    #[default]
    Open,
    Resolved(Resolution),
}

/// An issue together with its resolution state
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedIssue {
    pub(crate) issue: Issue,
    pub(crate) state: IssueState,
}

impl TrackedIssue {
    pub(crate) fn new(issue: Issue) -> Self {
        Self {
            issue,
            state: IssueState::Open,
        }
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    pub fn id(&self) -> &IssueId {
        &self.issue.id
    }

    pub fn span(&self) -> Span {
        self.issue.span
    }

    pub fn state(&self) -> &IssueState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, IssueState::Open)
    }

    pub fn is_resolved(&self) -> bool {
        !self.is_open()
    }
}

/// Selects which issue kinds an operation applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindFilter {
    Any,
    Only(IssueKind),
    AnyOf(Vec<IssueKind>),
}

impl KindFilter {
    pub fn matches(&self, kind: IssueKind) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Only(only) => *only == kind,
            KindFilter::AnyOf(kinds) => kinds.contains(&kind),
        }
    }
}

impl From<IssueKind> for KindFilter {
    fn from(kind: IssueKind) -> Self {
        KindFilter::Only(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn option(replacement: &str, priority: i32) -> ReplacementOption {
        ReplacementOption {
            replacement: replacement.to_string(),
            option_type: String::new(),
            confidence: 0.5,
            priority,
        }
    }

    #[test]
    fn test_preferred_replacement_uses_first_suggestion() {
        let issue = Issue::new("i1", IssueKind::HomophoneWord, Span::new(0, 2))
            .with_suggestions(["优秀", "出色"])
            .with_replacement_options(vec![option("棒棒", 9)]);

        assert_eq!(issue.preferred_replacement(), Some("优秀"));
    }

    #[test]
    fn test_preferred_replacement_falls_back_to_highest_priority_option() {
        let issue = Issue::new("i1", IssueKind::ProhibitedWord, Span::new(0, 2))
            .with_replacement_options(vec![
                option("广膏", 0),
                option("广*告", 1),
                option("guang告", 0),
            ]);

        assert_eq!(issue.preferred_replacement(), Some("广*告"));
    }

    #[test]
    fn test_preferred_replacement_ties_go_to_first_seen() {
        let issue = Issue::new("i1", IssueKind::ProhibitedWord, Span::new(0, 2))
            .with_replacement_options(vec![option("first", 2), option("second", 2)]);

        assert_eq!(issue.preferred_replacement(), Some("first"));
    }

    #[test]
    fn test_preferred_replacement_none_without_candidates() {
        let bare = Issue::new("i1", IssueKind::Style, Span::new(0, 2));
        assert_eq!(bare.preferred_replacement(), None);

        let empty_options = bare.clone().with_replacement_options(Vec::new());
        assert_eq!(empty_options.preferred_replacement(), None);
    }

    #[test]
    fn test_risk_level_ordering_and_wire_values() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::from(2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(7), RiskLevel::High);
        assert_eq!(u8::from(RiskLevel::High), 3);
    }

    #[test]
    fn test_kind_filter() {
        assert!(KindFilter::Any.matches(IssueKind::Style));
        assert!(KindFilter::Only(IssueKind::HomophoneWord).matches(IssueKind::HomophoneWord));
        assert!(!KindFilter::Only(IssueKind::HomophoneWord).matches(IssueKind::ProhibitedWord));

        let any_of = KindFilter::AnyOf(vec![IssueKind::ProhibitedWord, IssueKind::Style]);
        assert!(any_of.matches(IssueKind::Style));
        assert!(!any_of.matches(IssueKind::Other));
    }
}
