use log::{ error, info };
use std::sync::Arc;
use thiserror::Error;

use crate::errors::{ HostError, PipelineError };
use crate::models::artifact::FileSet;
use crate::models::repository::{ NewRepository, PublishReceipt, PublishStep, PublishedRepository };
use crate::traits::repository_host::RepositoryHost;

/// A failed publish, tagged with the step that failed.
///
/// Failures after creation keep the created repository: it exists remotely
/// and the caller has to be told where.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("create-repository failed: {0}")]
    Create(HostError),

    #[error("{step} failed for {}: {source}", .repository.html_url)]
    AfterCreate {
        step: PublishStep,
        source: HostError,
        repository: Box<PublishedRepository>,
    },
}

impl PublishError {
    pub fn step(&self) -> PublishStep {
        match self {
            PublishError::Create(_) => PublishStep::CreateRepository,
            PublishError::AfterCreate { step, .. } => *step,
        }
    }

    pub fn repository(&self) -> Option<&PublishedRepository> {
        match self {
            PublishError::Create(_) => None,
            PublishError::AfterCreate { repository, .. } => Some(repository.as_ref()),
        }
    }
}

impl From<PublishError> for PipelineError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Create(HostError::AlreadyExists(name)) => PipelineError::RepoAlreadyExists { name },
            PublishError::Create(source) => PipelineError::RepoCreateFailed(source),
            PublishError::AfterCreate { step, source, repository } =>
                PipelineError::RepoPublishFailed { step, source, repository },
        }
    }
}

/// Runs create → push → enable-site against a repository host
#[derive(Clone)]
pub struct RepositoryPublisher {
    host: Arc<dyn RepositoryHost>,
    owner: String,
}

impl RepositoryPublisher {
    pub fn new(host: Arc<dyn RepositoryHost>, owner: impl Into<String>) -> Self {
        Self {
            host,
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub async fn publish(
        &self,
        name: &str,
        description: &str,
        files: &FileSet,
        commit_message: &str
    ) -> Result<PublishReceipt, PublishError> {
        let request = NewRepository {
            owner: self.owner.clone(),
            name: name.to_string(),
            description: description.to_string(),
        };

        let mut repository = self.host.create_repository(&request).await.map_err(|e| {
            error!("Could not create repository {}/{}: {}", self.owner, name, e);
            PublishError::Create(e)
        })?;
        info!("Created repository {}", repository.html_url);

        let commit_sha = match self.host.push_files(&repository, files, commit_message).await {
            Ok(sha) => sha,
            Err(source) => {
                return Err(self.after_create(PublishStep::PushFiles, source, repository));
            }
        };

        let site_url = match self.host.enable_site(&repository).await {
            Ok(url) => url,
            Err(source) => {
                return Err(self.after_create(PublishStep::EnableSite, source, repository));
            }
        };
        repository.site_url = Some(site_url.clone());
        info!("Site for {} will be served at {}", repository.name, site_url);

        Ok(PublishReceipt {
            repository,
            commit_sha,
            site_url,
        })
    }

    fn after_create(&self, step: PublishStep, source: HostError, repository: PublishedRepository) -> PublishError {
        error!("Publishing {} failed at {}: {}. Repository left in place at {}", repository.name, step, source, repository.html_url);
        PublishError::AfterCreate {
            step,
            source,
            repository: Box::new(repository),
        }
    }
}

/// One-line description stored on the created repository
pub fn describe(brief: &str) -> String {
    let first_line = brief.lines().next().unwrap_or("").trim();
    let mut description: String = first_line.chars().take(120).collect();
    if first_line.chars().count() > 120 {
        description.push_str("...");
    }
    description
}
