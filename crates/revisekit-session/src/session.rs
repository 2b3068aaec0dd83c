use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use revisekit_engine::{EngineError, IssueId, KindFilter, RevisionEngine, Scores};

use crate::services::{
    AdvisoryNote, AnalysisService, DiscardHistory, HistoryRecord, HistoryStore, IdentityProvider,
    NoSuggestions, OptimizationService, ServiceError, Suggestion, SuggestionService,
};

/// Which external collaborator a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Analysis,
    Optimization,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Analysis => f.write_str("analysis"),
            ServiceKind::Optimization => f.write_str("optimization"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalFailure {
    #[error("{service} service timed out after {after:?}")]
    Timeout { service: ServiceKind, after: Duration },
    #[error("{service} service failed: {source}")]
    Service {
        service: ServiceKind,
        source: ServiceError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    External(#[from] ExternalFailure),
    /// A newer request of the same kind was issued while this one was out
    #[error("{0} response discarded, a newer request superseded it")]
    Superseded(ServiceKind),
    /// The buffer was edited while the optimization was in flight
    #[error("buffer changed while optimization was in flight")]
    StaleBuffer,
    #[error("nothing to submit, content is empty")]
    EmptyContent,
}

impl SessionError {
    /// Everything except a broken engine invariant can simply be retried
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Engine(err) => !err.is_defect(),
            _ => true,
        }
    }
}

/// Timeouts applied to collaborator calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub analysis_timeout: Duration,
    pub optimization_timeout: Duration,
    pub suggestion_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&revisekit_config::Config::default())
    }
}

impl From<&revisekit_config::Config> for SessionConfig {
    fn from(config: &revisekit_config::Config) -> Self {
        Self {
            analysis_timeout: config.analysis_timeout(),
            optimization_timeout: config.optimization_timeout(),
            suggestion_timeout: config.suggestion_timeout(),
        }
    }
}

/// The collaborators a session talks to
#[derive(Clone)]
pub struct Services {
    pub analysis: Arc<dyn AnalysisService>,
    pub optimization: Arc<dyn OptimizationService>,
    pub suggestions: Arc<dyn SuggestionService>,
    pub history: Arc<dyn HistoryStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Services {
    /// Analysis and optimization with no suggestion service and no history
    pub fn new(
        analysis: Arc<dyn AnalysisService>,
        optimization: Arc<dyn OptimizationService>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            analysis,
            optimization,
            suggestions: Arc::new(NoSuggestions),
            history: Arc::new(DiscardHistory),
            identity,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Arc<dyn SuggestionService>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub issue_count: usize,
    pub content_score: i32,
    pub notes: Vec<AdvisoryNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationSummary {
    pub optimized_text: String,
    pub scores: Scores,
    /// Issues the optimizer was asked to apply
    pub applied: Vec<IssueId>,
    pub suggestions: Vec<Suggestion>,
}

/// Bridges the analysis and optimization services into one engine.
///
/// The engine sits behind a mutex that is only taken for the synchronous
/// commit after a response arrives, never across an `.await`. Each request
/// kind carries a ticket counter; a response is committed only if no newer
/// request of the same kind was issued in the meantime, so results are never
/// applied out of order.
pub struct Session {
    engine: Mutex<RevisionEngine>,
    services: Services,
    config: SessionConfig,
    analysis_ticket: AtomicU64,
    optimization_ticket: AtomicU64,
    notes: Mutex<Vec<AdvisoryNote>>,
}

impl Session {
    pub fn new(services: Services, config: SessionConfig) -> Self {
        Self {
            engine: Mutex::new(RevisionEngine::new()),
            services,
            config,
            analysis_ticket: AtomicU64::new(0),
            optimization_ticket: AtomicU64::new(0),
            notes: Mutex::new(Vec::new()),
        }
    }

    /// Run `f` against the engine, for the interactive select/replace/ignore
    /// operations and for reading issues.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut RevisionEngine) -> R) -> R {
        f(&mut self.lock_engine())
    }

    pub fn text(&self) -> String {
        self.lock_engine().text()
    }

    pub fn scores(&self) -> Scores {
        self.lock_engine().scores()
    }

    /// Advisory notes from the last committed analysis
    pub fn notes(&self) -> Vec<AdvisoryNote> {
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop text, issues, scores and notes
    pub fn clear(&self) {
        self.lock_engine().clear();
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Analyse `text` and make it the buffer, with the returned issues.
    ///
    /// If another analysis is issued before this one's response arrives,
    /// this response is discarded with [`SessionError::Superseded`].
    pub async fn submit_analysis(&self, text: &str) -> Result<AnalysisSummary, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyContent);
        }
        let ticket = self.analysis_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.services.identity.session_token();

        log::debug!("Submitting analysis #{ticket} ({} chars)", text.chars().count());
        let result = call_with_timeout(
            ServiceKind::Analysis,
            self.config.analysis_timeout,
            self.services.analysis.analyze(text, &token),
        )
        .await?;

        let issue_count = result.issues.len();
        {
            // Ticket check and commit share one guard
            let mut engine = self.lock_engine();
            if self.analysis_ticket.load(Ordering::SeqCst) != ticket {
                log::debug!("Discarding analysis #{ticket}, superseded");
                return Err(SessionError::Superseded(ServiceKind::Analysis));
            }
            engine.load_analysis(text, result.issues, result.content_score)?;
            *self.notes.lock().unwrap_or_else(PoisonError::into_inner) = result.notes.clone();
        }

        log::info!(
            "Analysis #{ticket} committed: {issue_count} issues, score {}",
            result.content_score
        );
        Ok(AnalysisSummary {
            issue_count,
            content_score: result.content_score,
            notes: result.notes,
        })
    }

    /// Ask the optimizer to rewrite the current buffer, applying the open
    /// issues that match `filter`.
    ///
    /// On success the buffer is replaced wholesale and the issue set is
    /// emptied. The result is discarded if a newer optimization was issued
    /// or the buffer was edited while waiting.
    pub async fn submit_optimization(
        &self,
        filter: &KindFilter,
    ) -> Result<OptimizationSummary, SessionError> {
        let (text, apply, version) = {
            let engine = self.lock_engine();
            let apply: Vec<IssueId> = engine
                .store()
                .open()
                .filter(|tracked| filter.matches(tracked.issue().kind))
                .map(|tracked| tracked.id().clone())
                .collect();
            (engine.text(), apply, engine.version())
        };
        if text.trim().is_empty() {
            return Err(SessionError::EmptyContent);
        }
        let ticket = self.optimization_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.services.identity.session_token();

        log::debug!(
            "Submitting optimization #{ticket} with {} issues to apply",
            apply.len()
        );
        let result = call_with_timeout(
            ServiceKind::Optimization,
            self.config.optimization_timeout,
            self.services.optimization.optimize(&text, &apply, &token),
        )
        .await?;

        let scores = {
            let mut engine = self.lock_engine();
            if self.optimization_ticket.load(Ordering::SeqCst) != ticket {
                log::debug!("Discarding optimization #{ticket}, superseded");
                return Err(SessionError::Superseded(ServiceKind::Optimization));
            }
            if engine.version() != version {
                log::debug!("Discarding optimization #{ticket}, buffer changed");
                return Err(SessionError::StaleBuffer);
            }
            let score_after = engine.scores().before + result.score_delta;
            engine.apply_optimized(&result.optimized_text, score_after);
            engine.scores()
        };
        log::info!(
            "Optimization #{ticket} committed: score {} -> {}",
            scores.before,
            scores.after
        );

        let record = HistoryRecord {
            session: token,
            original: text.clone(),
            optimized: result.optimized_text.clone(),
            score_before: scores.before,
            score_after: scores.after,
            timestamp: now_secs(),
        };
        if let Err(err) = self.services.history.append(record).await {
            log::warn!("Failed to record optimization history: {err}");
        }

        let suggestions = self.load_suggestions(&text, &result.optimized_text).await;

        Ok(OptimizationSummary {
            optimized_text: result.optimized_text,
            scores,
            applied: apply,
            suggestions,
        })
    }

    async fn load_suggestions(&self, original: &str, optimized: &str) -> Vec<Suggestion> {
        let call = self.services.suggestions.suggest(original, Some(optimized));
        match tokio::time::timeout(self.config.suggestion_timeout, call).await {
            Ok(Ok(suggestions)) => suggestions,
            Ok(Err(err)) => {
                log::warn!("Suggestion service failed: {err}");
                Vec::new()
            }
            Err(_) => {
                log::warn!(
                    "Suggestion service timed out after {:?}",
                    self.config.suggestion_timeout
                );
                Vec::new()
            }
        }
    }

    fn lock_engine(&self) -> MutexGuard<'_, RevisionEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn call_with_timeout<T>(
    service: ServiceKind,
    after: Duration,
    call: impl std::future::Future<Output = Result<T, ServiceError>>,
) -> Result<T, ExternalFailure> {
    match tokio::time::timeout(after, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => {
            log::warn!("{service} service failed: {source}");
            Err(ExternalFailure::Service { service, source })
        }
        Err(_) => {
            log::warn!("{service} service timed out after {after:?}");
            Err(ExternalFailure::Timeout { service, after })
        }
    }
}

/// Returns the current Unix timestamp in seconds.
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
