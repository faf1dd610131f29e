use chrono::{ DateTime, Utc };
use serde::Serialize;
use std::time::Duration;

use crate::implementations::artifact_builder::generated_files;

/// Prompt handed to every provider in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    /// Standing instructions (system role where the provider supports one)
    pub instructions: String,
    /// The rendered user prompt
    pub prompt: String,
}

impl GenerationPrompt {
    /// Flattened form for providers without a separate system role
    pub fn flattened(&self) -> String {
        if self.instructions.is_empty() {
            self.prompt.clone()
        } else {
            format!("{}\n\n{}", self.instructions, self.prompt)
        }
    }
}

/// Normalized output of the generation client.
///
/// Created once per request and only read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Generated text, already stripped of provider-specific framing
    pub content: String,
    /// Name of the provider that produced `content`
    pub provider: String,
    pub model: String,
    /// True when the primary provider failed and the fallback answered
    pub fallback_used: bool,
    /// Why the primary provider was skipped, if it was
    pub primary_error: Option<String>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    pub generated_at: DateTime<Utc>,
}

impl GenerationResult {
    /// Generated files as ordered (path, content) pairs
    pub fn files(&self) -> Vec<(String, String)> {
        generated_files(&self.content)
            .iter()
            .map(|f| (f.path.clone(), f.content.clone()))
            .collect()
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
