use chrono::{ DateTime, Utc };
use serde::Serialize;

use crate::errors::ErrorKind;
use crate::models::outcome::PipelineStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Succeeded,
    Failed,
}

/// Body posted to the evaluator once a run has a terminal outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub status: ReportStatus,
    pub email: Option<String>,
    pub task: Option<String>,
    pub round: u32,
    pub nonce: Option<String>,
    pub repo_url: Option<String>,
    pub commit_sha: Option<String>,
    pub pages_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What happened when we tried to notify the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub delivered: bool,
    /// HTTP status returned by the evaluator, when it answered at all
    pub status: Option<u16>,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationOutcome {
    pub fn delivered(status: u16) -> Self {
        Self {
            delivered: true,
            status: Some(status),
            detail: "accepted".to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn undelivered(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            delivered: false,
            status,
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }
}
