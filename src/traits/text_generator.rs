use async_trait::async_trait;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::models::generation::GenerationPrompt;

/// One provider of the "produce code text from a prompt" capability.
///
/// Implementations normalize their provider-specific response shape and hand
/// back plain text; the caller never sees raw provider JSON.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name used in logs and responses
    fn name(&self) -> &str;

    /// Model identifier sent to the provider
    fn model(&self) -> &str;

    /// Upper bound for a single `generate` call
    fn timeout(&self) -> Duration;

    /// Produce text for the prompt
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, ProviderError>;
}
