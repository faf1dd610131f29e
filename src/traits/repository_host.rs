use async_trait::async_trait;

use crate::errors::HostError;
use crate::models::artifact::FileSet;
use crate::models::repository::{ NewRepository, PublishedRepository };

/// Remote host that owns repositories and serves static sites from them
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Create an empty repository with an initialized default branch.
    ///
    /// A name that is already taken must fail with `HostError::AlreadyExists`;
    /// implementations never pick another name on their own.
    async fn create_repository(&self, request: &NewRepository) -> Result<PublishedRepository, HostError>;

    /// Commit every file to the default branch in one commit. Returns the commit SHA.
    async fn push_files(
        &self,
        repository: &PublishedRepository,
        files: &FileSet,
        message: &str
    ) -> Result<String, HostError>;

    /// Serve the default branch root as a static site. Returns the site URL.
    async fn enable_site(&self, repository: &PublishedRepository) -> Result<String, HostError>;
}
