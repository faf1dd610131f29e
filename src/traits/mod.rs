pub mod text_generator;
pub mod repository_host;
pub mod completion_notifier;

// Re-export traits
pub use text_generator::TextGenerator;
pub use repository_host::RepositoryHost;
pub use completion_notifier::CompletionNotifier;
