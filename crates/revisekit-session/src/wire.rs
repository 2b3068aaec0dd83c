//! JSON shapes exchanged with the content service.
//!
//! Older service versions report only a `position` and the flagged `word`,
//! and not all of them send issue ids; [`AnalysisResponse::into_result`]
//! fills both gaps so the engine always sees complete spans with unique ids.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use revisekit_engine::{Issue, IssueId, IssueKind, ReplacementOption, RiskLevel, Span};

use crate::services::{AdvisoryNote, AnalysisResult, OptimizationResult, ServiceError, SessionToken};

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeRequest<'a> {
    pub content: &'a str,
    pub apply_suggestions: &'a [IssueId],
    pub user_session: &'a SessionToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireIssue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub start_pos: Option<usize>,
    #[serde(default)]
    pub end_pos: Option<usize>,
    /// Legacy start offset
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub replacement_options: Option<Vec<ReplacementOption>>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reason: String,
}

impl WireIssue {
    /// Convert to an engine issue. `index` is the issue's position in the
    /// response and names issues that arrive without an id.
    pub fn into_issue(self, index: usize) -> Result<Issue, ServiceError> {
        let start = self.start_pos.or(self.position).ok_or_else(|| {
            ServiceError::InvalidResponse(format!("issue {index} has no start offset"))
        })?;
        let end = match self.end_pos {
            Some(end) => end,
            None => start.checked_add(self.word.chars().count()).ok_or_else(|| {
                ServiceError::InvalidResponse(format!("issue {index} ends past usize::MAX"))
            })?,
        };

        Ok(Issue {
            id: IssueId(self.id.unwrap_or_else(|| format!("issue-{index}"))),
            kind: self.kind,
            span: Span::new(start, end),
            word: self.word,
            risk_level: self.risk_level,
            suggestions: self.suggestions,
            replacement_options: self.replacement_options,
            context: self.context,
            confidence: self.confidence,
            category: self.category,
            reason: self.reason,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    pub detected_issues: Vec<WireIssue>,
    pub content_score: i32,
    #[serde(default)]
    pub suggestions: Vec<AdvisoryNote>,
    #[serde(default)]
    pub processing_time: f64,
}

impl AnalysisResponse {
    /// Generated ids are `issue-<index>`, suffixed when the service already
    /// used that name.
    pub fn into_result(self) -> Result<AnalysisResult, ServiceError> {
        let mut taken: HashSet<String> = self
            .detected_issues
            .iter()
            .filter_map(|issue| issue.id.clone())
            .collect();

        let mut issues = Vec::with_capacity(self.detected_issues.len());
        for (index, mut issue) in self.detected_issues.into_iter().enumerate() {
            if issue.id.is_none() {
                let mut candidate = format!("issue-{index}");
                let mut suffix = 1;
                while taken.contains(&candidate) {
                    candidate = format!("issue-{index}-{suffix}");
                    suffix += 1;
                }
                taken.insert(candidate.clone());
                issue.id = Some(candidate);
            }
            issues.push(issue.into_issue(index)?);
        }
        Ok(AnalysisResult {
            issues,
            content_score: self.content_score,
            notes: self.suggestions,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeResponse {
    pub optimized_content: String,
    #[serde(default)]
    pub applied_changes: Vec<serde_json::Value>,
    pub score_improvement: i32,
    #[serde(default)]
    pub processing_time: f64,
}

impl From<OptimizeResponse> for OptimizationResult {
    fn from(response: OptimizeResponse) -> Self {
        OptimizationResult {
            optimized_text: response.optimized_content,
            score_delta: response.score_improvement,
        }
    }
}

/// Decode an analysis response body
pub fn parse_analysis(body: &str) -> Result<AnalysisResult, ServiceError> {
    serde_json::from_str::<AnalysisResponse>(body)?.into_result()
}

/// Decode an optimization response body
pub fn parse_optimization(body: &str) -> Result<OptimizationResult, ServiceError> {
    Ok(serde_json::from_str::<OptimizeResponse>(body)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ANALYSIS: &str = r#"{
        "detected_issues": [
            {
                "id": "i1",
                "type": "homophone_word",
                "word": "产品",
                "start_pos": 2,
                "end_pos": 4,
                "risk_level": 2,
                "suggestions": ["优秀", "出色"],
                "context": "这个产品太棒了",
                "confidence": 0.9,
                "category": "营销",
                "reason": "谐音"
            },
            {
                "type": "prohibited_word",
                "word": "最好",
                "position": 9,
                "risk_level": 3,
                "suggestions": [],
                "replacement_options": [
                    {"replacement": "很好", "type": "同义词", "confidence": 0.7, "priority": 1}
                ]
            },
            {
                "type": "sensitive_topic",
                "word": "x",
                "position": 0
            }
        ],
        "content_score": 65,
        "suggestions": [
            {"type": "content_length", "title": "内容偏短", "description": "建议补充细节", "priority": "medium"}
        ],
        "processing_time": 0.12
    }"#;

    #[test]
    fn test_parse_analysis_fills_legacy_fields() {
        let result = parse_analysis(ANALYSIS).unwrap();

        assert_eq!(result.content_score, 65);
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.notes[0].note_type, "content_length");

        let first = &result.issues[0];
        assert_eq!(first.id, IssueId::from("i1"));
        assert_eq!(first.kind, IssueKind::HomophoneWord);
        assert_eq!(first.span, Span::new(2, 4));
        assert_eq!(first.risk_level, RiskLevel::Medium);

        let second = &result.issues[1];
        assert_eq!(second.id, IssueId::from("issue-1"));
        assert_eq!(second.span, Span::new(9, 11));
        assert_eq!(second.risk_level, RiskLevel::High);
        assert_eq!(second.preferred_replacement(), Some("很好"));

        let third = &result.issues[2];
        assert_eq!(third.kind, IssueKind::Other);
        assert_eq!(third.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_issue_without_any_offset_is_rejected() {
        let body = r#"{"detected_issues": [{"type": "style", "word": "啊"}], "content_score": 80}"#;

        let err = parse_analysis(body).unwrap_err();

        assert_eq!(
            err,
            ServiceError::InvalidResponse("issue 0 has no start offset".to_string())
        );
    }

    #[test]
    fn test_generated_ids_avoid_ids_the_service_sent() {
        let body = r#"{
            "detected_issues": [
                {"type": "style", "word": "a", "position": 0},
                {"id": "issue-0", "type": "style", "word": "b", "position": 2},
                {"id": "issue-2", "type": "style", "word": "c", "position": 4},
                {"type": "style", "word": "d", "position": 6}
            ],
            "content_score": 70
        }"#;

        let result = parse_analysis(body).unwrap();
        let ids: Vec<&str> = result.issues.iter().map(|issue| issue.id.as_str()).collect();

        assert_eq!(ids, vec!["issue-0-1", "issue-0", "issue-2", "issue-3"]);

        let mut engine = revisekit_engine::RevisionEngine::new();
        engine
            .load_analysis("a_b_c_d", result.issues, result.content_score)
            .unwrap();
        assert_eq!(engine.store().len(), 4);
    }

    #[test]
    fn test_huge_legacy_position_is_invalid_response() {
        let body = format!(
            r#"{{"detected_issues": [{{"type": "style", "word": "ab", "position": {}}}], "content_score": 50}}"#,
            usize::MAX
        );

        assert_eq!(
            parse_analysis(&body).unwrap_err(),
            ServiceError::InvalidResponse("issue 0 ends past usize::MAX".to_string())
        );
    }

    #[test]
    fn test_parse_optimization() {
        let body = r#"{
            "optimized_content": "这个产品很好✨",
            "applied_changes": [{"type": "homophone_replacement"}],
            "score_improvement": 12,
            "processing_time": 0.3
        }"#;

        let result = parse_optimization(body).unwrap();

        assert_eq!(
            result,
            OptimizationResult {
                optimized_text: "这个产品很好✨".to_string(),
                score_delta: 12,
            }
        );
    }

    #[test]
    fn test_malformed_body_is_invalid_response() {
        assert!(matches!(
            parse_optimization("{\"optimized_content\": 3}"),
            Err(ServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_optimize_request_shape() {
        let token = SessionToken::new("user_1");
        let ids = [IssueId::from("i1"), IssueId::from("i2")];
        let request = OptimizeRequest {
            content: "text",
            apply_suggestions: &ids,
            user_session: &token,
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "content": "text",
                "apply_suggestions": ["i1", "i2"],
                "user_session": "user_1"
            })
        );
    }
}
