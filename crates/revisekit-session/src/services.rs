//! Contracts of the services a session talks to.
//!
//! Transport lives elsewhere; implementations only need to turn a request
//! into one of these results. Every call gets the session token, which the
//! session never looks inside.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use revisekit_engine::{Issue, IssueId};

/// Opaque token identifying the user session to every service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Fresh anonymous token of the form `user_<uuid>`
    pub fn generate() -> Self {
        Self(format!("user_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service rejected the request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::InvalidResponse(err.to_string())
    }
}

/// An improvement hint attached to an analysis, shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryNote {
    #[serde(rename = "type")]
    pub note_type: String,
    pub title: String,
    pub description: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub content_score: i32,
    pub notes: Vec<AdvisoryNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub optimized_text: String,
    pub score_delta: i32,
}

/// Decoration suggestion for optimized content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "描述")]
    pub description: String,
    #[serde(rename = "建议")]
    pub suggestion: String,
    #[serde(rename = "场景", default)]
    pub scenes: Vec<String>,
    #[serde(rename = "推荐理由", default)]
    pub reason: String,
    #[serde(rename = "置信度", default)]
    pub confidence: f64,
}

/// What gets reported after an optimization is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub session: SessionToken,
    pub original: String,
    pub optimized: String,
    pub score_before: i32,
    pub score_after: i32,
    /// Unix seconds
    pub timestamp: u64,
}

pub trait AnalysisService: Send + Sync {
    fn analyze<'a>(
        &'a self,
        text: &'a str,
        session: &'a SessionToken,
    ) -> BoxFuture<'a, Result<AnalysisResult, ServiceError>>;
}

pub trait OptimizationService: Send + Sync {
    fn optimize<'a>(
        &'a self,
        text: &'a str,
        apply: &'a [IssueId],
        session: &'a SessionToken,
    ) -> BoxFuture<'a, Result<OptimizationResult, ServiceError>>;
}

/// Advisory only; failures leave the suggestions empty
pub trait SuggestionService: Send + Sync {
    fn suggest<'a>(
        &'a self,
        original: &'a str,
        optimized: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, ServiceError>>;
}

/// Append-only sink for optimization history
pub trait HistoryStore: Send + Sync {
    fn append<'a>(&'a self, record: HistoryRecord) -> BoxFuture<'a, Result<(), ServiceError>>;
}

pub trait IdentityProvider: Send + Sync {
    fn session_token(&self) -> SessionToken;
}

/// Identity fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct StaticIdentity(SessionToken);

impl StaticIdentity {
    pub fn new(token: SessionToken) -> Self {
        Self(token)
    }

    /// Use the configured token, or generate one if there is none
    pub fn from_config(config: &revisekit_config::Config) -> Self {
        let token = config
            .session_token
            .clone()
            .map(SessionToken::new)
            .unwrap_or_else(SessionToken::generate);
        Self(token)
    }
}

impl IdentityProvider for StaticIdentity {
    fn session_token(&self) -> SessionToken {
        self.0.clone()
    }
}

/// Suggestion service for deployments without one
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuggestions;

impl SuggestionService for NoSuggestions {
    fn suggest<'a>(
        &'a self,
        _original: &'a str,
        _optimized: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, ServiceError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// History store that keeps nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardHistory;

impl HistoryStore for DiscardHistory {
    fn append<'a>(&'a self, _record: HistoryRecord) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async { Ok(()) })
    }
}
