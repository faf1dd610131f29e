use chrono::{ DateTime, Utc };
use serde::Serialize;
use std::fmt;

/// What the publisher asks the host to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub owner: String,
    pub name: String,
    pub description: String,
}

/// A repository that exists on the remote host.
///
/// Once one of these has been returned the repository is real and visible;
/// nothing in this crate deletes it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedRepository {
    pub name: String,
    pub owner: String,
    pub html_url: String,
    pub default_branch: String,
    pub site_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The three steps of a publish, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStep {
    CreateRepository,
    PushFiles,
    EnableSite,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishStep::CreateRepository => write!(f, "create-repository"),
            PublishStep::PushFiles => write!(f, "push-files"),
            PublishStep::EnableSite => write!(f, "enable-site"),
        }
    }
}

/// Result of a fully successful publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub repository: PublishedRepository,
    pub commit_sha: String,
    pub site_url: String,
}
