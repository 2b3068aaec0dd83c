//! Services backed by local files, for running without a content service.

use std::path::PathBuf;

use futures::future::BoxFuture;
use revisekit_engine::IssueId;
use revisekit_session::wire::{parse_analysis, parse_optimization};
use revisekit_session::{
    AnalysisResult, AnalysisService, HistoryRecord, HistoryStore, OptimizationResult,
    OptimizationService, ServiceError, SessionToken,
};
use tokio::io::AsyncWriteExt;

/// Replays a saved analysis response whatever text is submitted
pub struct RecordedAnalysis {
    body: String,
}

impl RecordedAnalysis {
    pub fn new(body: String) -> Self {
        Self { body }
    }
}

impl AnalysisService for RecordedAnalysis {
    fn analyze<'a>(
        &'a self,
        _text: &'a str,
        _session: &'a SessionToken,
    ) -> BoxFuture<'a, Result<AnalysisResult, ServiceError>> {
        Box::pin(async move { parse_analysis(&self.body) })
    }
}

/// Replays a saved optimization response, or refuses when there is none
pub struct RecordedOptimization {
    body: Option<String>,
}

impl RecordedOptimization {
    pub fn new(body: Option<String>) -> Self {
        Self { body }
    }
}

impl OptimizationService for RecordedOptimization {
    fn optimize<'a>(
        &'a self,
        _text: &'a str,
        apply: &'a [IssueId],
        _session: &'a SessionToken,
    ) -> BoxFuture<'a, Result<OptimizationResult, ServiceError>> {
        Box::pin(async move {
            log::debug!("Replaying optimization for {} issues", apply.len());
            match &self.body {
                Some(body) => parse_optimization(body),
                None => Err(ServiceError::Rejected(
                    "no optimization response available offline".to_string(),
                )),
            }
        })
    }
}

/// Appends each record as one JSON line
pub struct JsonLinesHistory {
    path: PathBuf,
}

impl JsonLinesHistory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistoryStore for JsonLinesHistory {
    fn append<'a>(&'a self, record: HistoryRecord) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            let mut line = serde_json::to_string(&record)?;
            line.push('\n');

            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| ServiceError::Transport(format!("{}: {e}", self.path.display())))?;
            let io_error = |e: std::io::Error| {
                ServiceError::Transport(format!("{}: {e}", self.path.display()))
            };
            file.write_all(line.as_bytes()).await.map_err(io_error)?;
            file.flush().await.map_err(io_error)?;
            Ok(())
        })
    }
}
