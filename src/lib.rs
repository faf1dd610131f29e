pub mod models;
pub mod traits;
pub mod errors;
pub mod config;
pub mod implementations;
#[cfg(test)]
pub mod tests;

// Re-export core components
pub use config::{ ConfigError, Secret, ServiceConfig };
pub use errors::{ ErrorKind, HostError, NotifyError, PipelineError, PipelineResult, ProviderError };
pub use implementations::{
    artifact_builder::{ ArtifactBuilder, ArtifactError },
    generation_client::{ GenerationClient, GenerationError },
    pipeline::{ Pipeline, PipelineRun },
    publisher::{ PublishError, RepositoryPublisher },
    validator::{ RequestValidator, ValidationError },
};
pub use models::{
    artifact::{ ArtifactFile, FileOrigin, FileSet },
    generation::{ GenerationPrompt, GenerationResult },
    notification::{ CompletionReport, NotificationOutcome },
    outcome::{ FailureResponse, PipelineResponse, PipelineStage, SuccessResponse },
    repository::{ PublishReceipt, PublishStep, PublishedRepository },
    request::GenerationRequest,
};
pub use traits::{ CompletionNotifier, RepositoryHost, TextGenerator };
