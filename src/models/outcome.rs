use serde::Serialize;
use std::fmt;

use crate::errors::{ ErrorKind, PipelineError };
use crate::models::notification::NotificationOutcome;

/// Pipeline states. The derived ordering is the only legal direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validating,
    Generating,
    Building,
    Publishing,
    Notifying,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Validating => write!(f, "validating"),
            PipelineStage::Generating => write!(f, "generating"),
            PipelineStage::Building => write!(f, "building"),
            PipelineStage::Publishing => write!(f, "publishing"),
            PipelineStage::Notifying => write!(f, "notifying"),
            PipelineStage::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    pub repo_name: String,
    pub repository_url: String,
    pub site_url: String,
    pub commit_sha: String,
    pub provider: String,
    pub fallback_used: bool,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureResponse {
    /// Stage the run was in when it failed
    pub stage: PipelineStage,
    pub error_kind: ErrorKind,
    pub message: String,
    /// Set when a repository was created before the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationOutcome>,
}

/// The one terminal answer a caller gets for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineResponse {
    Success(SuccessResponse),
    Failure(FailureResponse),
}

impl PipelineResponse {
    pub fn failure(stage: PipelineStage, error: &PipelineError) -> Self {
        PipelineResponse::Failure(FailureResponse {
            stage,
            error_kind: error.kind(),
            message: error.to_string(),
            repository_url: error.repository().map(|r| r.html_url.clone()),
            notification: None,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResponse::Success(_))
    }

    /// HTTP-style status for the response surface
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineResponse::Success(_) => 200,
            PipelineResponse::Failure(failure) => failure.error_kind.status_code(),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            PipelineResponse::Success(_) => None,
            PipelineResponse::Failure(failure) => Some(failure.error_kind),
        }
    }
}
