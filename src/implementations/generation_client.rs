use chrono::Utc;
use log::{ info, warn };
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::errors::ProviderError;
use crate::models::generation::{ GenerationPrompt, GenerationResult };
use crate::traits::text_generator::TextGenerator;

/// Both providers were tried and both failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("primary provider {primary_provider} failed: {primary}; fallback provider {fallback_provider} failed: {fallback}")]
pub struct GenerationError {
    pub primary_provider: String,
    pub primary: ProviderError,
    pub fallback_provider: String,
    pub fallback: ProviderError,
}

const DEFAULT_INSTRUCTIONS: &str =
    "You are a senior web developer. You write complete, working static websites \
that run on GitHub Pages without a build step.";

const DEFAULT_TEMPLATE: &str =
    r#"Build a static web application for the following brief:

{{brief}}

The result will be checked against these requirements:
{{checks}}

Output every file as a fenced code block. Put the file's relative path in the
opening fence, for example:

```html index.html
<!DOCTYPE html>
...
```

Always include an index.html entry page at the repository root. Do not
include explanations outside the code blocks."#;

/// Calls the primary provider, then at most once the fallback provider.
///
/// There are no retries beyond that single hop, so the worst-case latency is
/// the primary timeout plus the fallback timeout.
#[derive(Clone)]
pub struct GenerationClient {
    primary: Arc<dyn TextGenerator>,
    fallback: Arc<dyn TextGenerator>,
    instructions: String,
    template: String,
}

impl GenerationClient {
    pub fn new(primary: Arc<dyn TextGenerator>, fallback: Arc<dyn TextGenerator>) -> Self {
        Self {
            primary,
            fallback,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Replace the prompt template. `{{brief}}` and `{{checks}}` are substituted.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Provider names in the order they are tried
    pub fn provider_names(&self) -> [&str; 2] {
        [self.primary.name(), self.fallback.name()]
    }

    /// Render the prompt. Attachments never appear in it.
    pub fn render_prompt(&self, brief: &str, checks: &[String]) -> GenerationPrompt {
        let checks = if checks.is_empty() {
            "- (no explicit checks)".to_string()
        } else {
            checks
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let prompt = self.template.replace("{{brief}}", brief).replace("{{checks}}", &checks);
        GenerationPrompt {
            instructions: self.instructions.clone(),
            prompt,
        }
    }

    pub async fn generate(&self, prompt: &GenerationPrompt) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();

        let primary_error = match attempt(self.primary.as_ref(), prompt).await {
            Ok(content) => {
                info!("Generated {} characters with {}", content.len(), self.primary.name());
                return Ok(self.result(self.primary.as_ref(), content, None, started));
            }
            Err(e) => e,
        };

        warn!(
            "Primary provider {} failed: {}. Falling back to {}",
            self.primary.name(),
            primary_error,
            self.fallback.name()
        );

        match attempt(self.fallback.as_ref(), prompt).await {
            Ok(content) => {
                info!("Generated {} characters with fallback {}", content.len(), self.fallback.name());
                Ok(self.result(self.fallback.as_ref(), content, Some(primary_error), started))
            }
            Err(fallback_error) => {
                warn!("Fallback provider {} failed: {}", self.fallback.name(), fallback_error);
                Err(GenerationError {
                    primary_provider: self.primary.name().to_string(),
                    primary: primary_error,
                    fallback_provider: self.fallback.name().to_string(),
                    fallback: fallback_error,
                })
            }
        }
    }

    fn result(
        &self,
        provider: &dyn TextGenerator,
        content: String,
        primary_error: Option<ProviderError>,
        started: Instant
    ) -> GenerationResult {
        GenerationResult {
            content,
            provider: provider.name().to_string(),
            model: provider.model().to_string(),
            fallback_used: primary_error.is_some(),
            primary_error: primary_error.map(|e| e.to_string()),
            elapsed: started.elapsed(),
            generated_at: Utc::now(),
        }
    }
}

/// One bounded call. An elapsed timeout counts as a transport failure.
async fn attempt(provider: &dyn TextGenerator, prompt: &GenerationPrompt) -> Result<String, ProviderError> {
    let timeout = provider.timeout();
    let content = tokio::time
        ::timeout(timeout, provider.generate(prompt)).await
        .map_err(|_| ProviderError::Timeout(timeout.as_secs()))??;
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(content)
}
