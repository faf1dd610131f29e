use chrono::Utc;
use log::warn;
use serde_json::{ json, Value };
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const REDACTED: &str = "[redacted]";

/// Append-only JSON lines record of inbound requests
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Best effort: a failed write is logged and otherwise ignored
    pub fn record(&self, payload: &Value) {
        let entry = json!({ "time": Utc::now().to_rfc3339(), "request": redact(payload) });
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", entry));
        if let Err(e) = result {
            warn!("Could not write audit log {}: {}", self.path.display(), e);
        }
    }
}

/// Copy of the payload with the secret and attachment bodies blanked out
pub fn redact(payload: &Value) -> Value {
    let mut copy = payload.clone();
    if let Some(object) = copy.as_object_mut() {
        if object.contains_key("secret") {
            object.insert("secret".to_string(), Value::String(REDACTED.to_string()));
        }
        if let Some(attachments) = object.get_mut("attachments").and_then(Value::as_array_mut) {
            for attachment in attachments.iter_mut().filter_map(Value::as_object_mut) {
                if attachment.contains_key("content_base64") {
                    attachment.insert("content_base64".to_string(), Value::String(REDACTED.to_string()));
                }
            }
        }
    }
    copy
}
