use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::implementations::artifact_builder::ArtifactError;
use crate::implementations::generation_client::GenerationError;
use crate::models::repository::{ PublishStep, PublishedRepository };

/// Terminal errors of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),

    #[error("Artifact build failed: {0}")]
    ArtifactBuildFailed(#[from] ArtifactError),

    #[error("Repository {name} already exists")]
    RepoAlreadyExists { name: String },

    #[error("Repository creation failed: {0}")]
    RepoCreateFailed(HostError),

    #[error("Repository publish failed at step {step}: {source}")]
    RepoPublishFailed {
        step: PublishStep,
        source: HostError,
        /// The repository that was created before the failing step
        repository: Box<PublishedRepository>,
    },

    #[error("Notification failed: {0}")]
    NotificationFailed(#[from] NotifyError),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Unauthorized(_) => ErrorKind::Unauthorized,
            PipelineError::MalformedRequest(_) => ErrorKind::MalformedRequest,
            PipelineError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            PipelineError::ArtifactBuildFailed(_) => ErrorKind::ArtifactBuildFailed,
            PipelineError::RepoAlreadyExists { .. } => ErrorKind::RepoAlreadyExists,
            PipelineError::RepoCreateFailed(_) => ErrorKind::RepoCreateFailed,
            PipelineError::RepoPublishFailed { .. } => ErrorKind::RepoPublishFailed,
            PipelineError::NotificationFailed(_) => ErrorKind::NotificationFailed,
        }
    }

    /// The partially published repository, if this error left one behind
    pub fn repository(&self) -> Option<&PublishedRepository> {
        match self {
            PipelineError::RepoPublishFailed { repository, .. } => Some(repository.as_ref()),
            _ => None,
        }
    }
}

/// Stable, serializable error codes for the response surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Unauthorized,
    MalformedRequest,
    GenerationFailed,
    ArtifactBuildFailed,
    RepoAlreadyExists,
    RepoCreateFailed,
    RepoPublishFailed,
    NotificationFailed,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Unauthorized => 401,
            ErrorKind::MalformedRequest => 400,
            ErrorKind::RepoAlreadyExists => 409,
            ErrorKind::GenerationFailed
            | ErrorKind::RepoCreateFailed
            | ErrorKind::RepoPublishFailed
            | ErrorKind::NotificationFailed => 502,
            ErrorKind::ArtifactBuildFailed => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Failures of a single text-generation provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("authentication rejected (HTTP {status})")]
    Auth { status: u16 },

    #[error("rate limited or out of quota")]
    RateLimited,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("provider returned no content")]
    EmptyResponse,
}

impl ProviderError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ProviderError::Auth { status },
            429 => ProviderError::RateLimited,
            _ => ProviderError::Http { status, message: truncate(&body, 300) },
        }
    }
}

/// Failures reported by the repository host
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("repository {0} already exists")]
    AlreadyExists(String),

    #[error("authentication rejected: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("timed out")]
    Timeout,

    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HostError::Timeout
        } else if err.is_decode() {
            HostError::MalformedResponse(err.to_string())
        } else {
            HostError::Transport(err.to_string())
        }
    }
}

/// Failures delivering a completion report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("evaluator endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("evaluator timed out")]
    Timeout,

    #[error("evaluator answered HTTP {status}")]
    Rejected { status: u16 },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotifyError::Timeout
        } else {
            NotifyError::Unreachable(err.to_string())
        }
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
