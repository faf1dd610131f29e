use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use log::{ debug, warn };
use serde_json::Value;
use sha2::{ Digest, Sha256 };
use thiserror::Error;

use crate::config::Secret;
use crate::errors::PipelineError;
use crate::models::request::{
    Attachment,
    DecodedAttachment,
    GenerationRequest,
    RawGenerationRequest,
    Requester,
};

/// Longest repository name the host accepts
const MAX_REPO_NAME_LEN: usize = 100;

const DERIVED_PREFIX: &str = "gen-";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Malformed(String),
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Unauthorized(msg) => PipelineError::Unauthorized(msg),
            ValidationError::Malformed(msg) => PipelineError::MalformedRequest(msg),
        }
    }
}

/// Authenticates and validates inbound requests. Pure: no I/O of any kind.
#[derive(Clone)]
pub struct RequestValidator {
    secret_digest: Vec<u8>,
}

impl RequestValidator {
    pub fn new(secret: &Secret) -> Self {
        Self {
            secret_digest: Sha256::digest(secret.expose().as_bytes()).to_vec(),
        }
    }

    /// Validate a decoded JSON payload.
    ///
    /// The secret is checked before any other field so unauthenticated callers
    /// learn nothing about what else is wrong with their request.
    pub fn validate(&self, payload: &Value) -> Result<GenerationRequest, ValidationError> {
        let object = payload
            .as_object()
            .ok_or_else(|| ValidationError::Malformed("request body must be a JSON object".to_string()))?;

        match object.get("secret").and_then(Value::as_str) {
            Some(secret) if self.secret_matches(secret) => {}
            Some(_) => {
                warn!("Rejected request with invalid secret");
                return Err(ValidationError::Unauthorized("invalid secret".to_string()));
            }
            None => {
                warn!("Rejected request without secret");
                return Err(ValidationError::Unauthorized("missing secret".to_string()));
            }
        }

        let raw: RawGenerationRequest = serde_json
            ::from_value(payload.clone())
            .map_err(|e| ValidationError::Malformed(format!("invalid request field: {}", e)))?;

        let brief = raw.brief
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ValidationError::Malformed("missing required field: brief".to_string()))?
            .to_string();

        let round = raw.round.unwrap_or(1);
        if round == 0 {
            return Err(ValidationError::Malformed("round must be at least 1".to_string()));
        }

        if let Some(email) = raw.email.as_deref() {
            if !email.contains('@') {
                return Err(ValidationError::Malformed(format!("invalid email: {}", email)));
            }
        }

        let evaluation_url = match raw.evaluation_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(validate_url(url)?),
            _ => None,
        };

        let task = non_blank(raw.task);
        let repo_name = match non_blank(raw.repo_name) {
            Some(name) => {
                if !is_valid_repo_name(&name) {
                    return Err(ValidationError::Malformed(format!("invalid repository name: {}", name)));
                }
                name
            }
            None => derive_repo_name(task.as_deref()),
        };

        let checks = raw.checks
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let attachments = raw.attachments
            .unwrap_or_default()
            .iter()
            .map(decode_attachment)
            .collect::<Result<Vec<_>, _>>()?;

        let request = GenerationRequest {
            id: uuid::Uuid::new_v4().simple().to_string(),
            brief,
            repo_name,
            checks,
            requester: Requester {
                email: non_blank(raw.email),
                task,
                round,
                nonce: non_blank(raw.nonce),
            },
            evaluation_url,
            attachments,
            received_at: Utc::now(),
        };

        debug!(
            "Validated request {} for repository {} ({} attachments)",
            request.id,
            request.repo_name,
            request.attachments.len()
        );
        Ok(request)
    }

    fn secret_matches(&self, candidate: &str) -> bool {
        let digest = Sha256::digest(candidate.as_bytes());
        digest
            .iter()
            .zip(self.secret_digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_url(url: &str) -> Result<String, ValidationError> {
    let parsed = reqwest::Url
        ::parse(url)
        .map_err(|e| ValidationError::Malformed(format!("invalid evaluation_url {}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ValidationError::Malformed(format!("evaluation_url must be an http(s) URL: {}", url)));
    }
    Ok(parsed.to_string())
}

fn decode_attachment(attachment: &Attachment) -> Result<DecodedAttachment, ValidationError> {
    let filename = attachment.filename.trim();
    if filename.is_empty() {
        return Err(ValidationError::Malformed("attachment filename is empty".to_string()));
    }

    // Accept data URIs as well as bare base64
    let body = match attachment.content_base64.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => attachment.content_base64.as_str(),
    };
    let compact: String = body
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact.as_bytes()).map_err(|e|
        ValidationError::Malformed(format!("attachment {} is not valid base64: {}", filename, e))
    )?;

    Ok(DecodedAttachment {
        filename: filename.to_string(),
        bytes,
    })
}

/// GitHub repository naming rules
pub fn is_valid_repo_name(name: &str) -> bool {
    !name.is_empty() &&
        name.len() <= MAX_REPO_NAME_LEN &&
        name != "." &&
        name != ".." &&
        name.chars().all(|c| (c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
}

/// `gen-<task slug>` when a task is given, `gen-<random id>` otherwise
pub fn derive_repo_name(task: Option<&str>) -> String {
    let slug = task.map(slugify).unwrap_or_default();
    if slug.is_empty() {
        let id = uuid::Uuid::new_v4().simple().to_string();
        return format!("{}{}", DERIVED_PREFIX, &id[..8]);
    }
    let mut name = format!("{}{}", DERIVED_PREFIX, slug);
    name.truncate(MAX_REPO_NAME_LEN);
    trim_name_tail(&name).to_string()
}

/// GitHub rewrites or rejects names ending in `.git`, `.` or `-`
fn trim_name_tail(name: &str) -> &str {
    let mut name = name;
    loop {
        let trimmed = name.trim_end_matches(|c: char| c == '-' || c == '.');
        let trimmed = match trimmed.len().checked_sub(4) {
            Some(cut) if trimmed[cut..].eq_ignore_ascii_case(".git") => &trimmed[..cut],
            _ => trimmed,
        };
        if trimmed.len() == name.len() {
            return trimmed;
        }
        name = trimmed;
    }
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches(|c: char| c == '-' || c == '.').to_string()
}
