use async_trait::async_trait;
use log::{ debug, info, warn };
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::time::Duration;

use crate::config::{ ProviderConfig, Secret };
use crate::errors::ProviderError;
use crate::models::generation::GenerationPrompt;
use crate::traits::text_generator::TextGenerator;

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client
        ::builder()
        .timeout(timeout)
        .user_agent(concat!("pagesmith/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to create HTTP client: {}", e)))
}

fn map_send_error(provider: &str, err: reqwest::Error, timeout: Duration) -> ProviderError {
    warn!("Network error when calling {}: {}", provider, err);
    if err.is_timeout() {
        ProviderError::Timeout(timeout.as_secs())
    } else {
        ProviderError::Transport(err.to_string())
    }
}

async fn read_success_body(
    provider: &str,
    response: reqwest::Response
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response
        .text().await
        .map_err(|e| ProviderError::MalformedResponse(format!("unreadable body: {}", e)))?;
    if !status.is_success() {
        warn!("{} API error: HTTP {}", provider, status.as_u16());
        return Err(ProviderError::from_status(status.as_u16(), body));
    }
    debug!("{} response length: {} characters", provider, body.len());
    Ok(body)
}

/// OpenAI chat-completions request types
#[derive(Debug, Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Any endpoint that speaks the OpenAI chat-completions format
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    name: String,
    endpoint: String,
    model: String,
    api_key: Secret,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: &ProviderConfig, api_key: Secret) -> Result<Self, ProviderError> {
        Ok(Self {
            name: config.name.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout(),
            http_client: build_http_client(config.timeout())?,
        })
    }

    fn request_body(&self, prompt: &GenerationPrompt) -> ChatRequest<'_> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.instructions.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: prompt.instructions.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.prompt.clone(),
        });
        ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response
pub fn extract_chat_content(body: &str) -> Result<String, ProviderError> {
    let json: Value = serde_json
        ::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let content = json["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .ok_or_else(|| ProviderError::MalformedResponse("missing choices[0].message.content".to_string()))?;

    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, ProviderError> {
        info!("Making chat completion request to {} ({})", self.name, self.model);
        debug!("Prompt length: {} characters", prompt.prompt.len());

        let response = self.http_client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&self.request_body(prompt))
            .send().await
            .map_err(|e| map_send_error(&self.name, e, self.timeout))?;

        let body = read_success_body(&self.name, response).await?;
        extract_chat_content(&body)
    }
}

/// Hugging Face hosted inference for plain text-generation models
#[derive(Clone)]
pub struct HuggingFaceProvider {
    name: String,
    endpoint: String,
    model: String,
    api_key: Secret,
    max_length: u32,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn new(config: &ProviderConfig, api_key: Secret) -> Result<Self, ProviderError> {
        Ok(Self {
            name: config.name.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            max_length: config.max_tokens,
            timeout: config.timeout(),
            http_client: build_http_client(config.timeout())?,
        })
    }
}

/// The inference API answers either `[{"generated_text": ..}]` or `{"generated_text": ..}`
pub fn extract_generated_text(body: &str) -> Result<String, ProviderError> {
    let json: Value = serde_json
        ::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if let Some(error) = json.get("error").and_then(Value::as_str) {
        return Err(ProviderError::MalformedResponse(format!("provider error: {}", error)));
    }

    let text = match &json {
        Value::Array(items) => items.first().and_then(|item| item["generated_text"].as_str()),
        Value::Object(_) => json["generated_text"].as_str(),
        _ => None,
    }.ok_or_else(|| ProviderError::MalformedResponse("missing generated_text".to_string()))?;

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl TextGenerator for HuggingFaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, ProviderError> {
        info!("Making inference request to {} ({})", self.name, self.model);

        let payload =
            serde_json::json!({
            "inputs": prompt.flattened(),
            "parameters": {
                "max_length": self.max_length,
                "return_full_text": false
            }
        });

        let response = self.http_client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&payload)
            .send().await
            .map_err(|e| map_send_error(&self.name, e, self.timeout))?;

        let body = read_success_body(&self.name, response).await?;
        extract_generated_text(&body)
    }
}
