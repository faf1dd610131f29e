pub mod validator;
pub mod providers;
pub mod generation_client;
pub mod artifact_builder;
pub mod github_host;
pub mod publisher;
pub mod evaluator_notifier;
pub mod attachment_store;
pub mod audit;
pub mod pipeline;
