pub mod request;
pub mod generation;
pub mod artifact;
pub mod repository;
pub mod notification;
pub mod outcome;

// Re-export common model types
pub use request::{ Attachment, DecodedAttachment, GenerationRequest, RawGenerationRequest, Requester };
pub use generation::{ GenerationPrompt, GenerationResult };
pub use artifact::{ ArtifactFile, FileOrigin, FileSet };
pub use repository::{ NewRepository, PublishReceipt, PublishStep, PublishedRepository };
pub use notification::{ CompletionReport, NotificationOutcome, ReportStatus };
pub use outcome::{ FailureResponse, PipelineResponse, PipelineStage, SuccessResponse };
