use log::info;
use std::fs;
use std::path::{ Path, PathBuf };
use thiserror::Error;

use crate::models::request::DecodedAttachment;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to stage attachment {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Writes request attachments to a local staging area.
///
/// Staged files are kept for inspection only; nothing reads them back into
/// the generation prompt.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stage every attachment under `<root>/<request_id>/`. Returns the written paths.
    pub fn stage(&self, request_id: &str, attachments: &[DecodedAttachment]) -> Result<Vec<PathBuf>, StagingError> {
        if attachments.is_empty() {
            return Ok(Vec::new());
        }

        let dir = self.root.join(request_id);
        fs::create_dir_all(&dir).map_err(|source| StagingError::Io {
            name: dir.display().to_string(),
            source,
        })?;

        let mut written = Vec::with_capacity(attachments.len());
        for (index, attachment) in attachments.iter().enumerate() {
            let path = dir.join(safe_file_name(&attachment.filename, index));
            fs::write(&path, &attachment.bytes).map_err(|source| StagingError::Io {
                name: attachment.filename.clone(),
                source,
            })?;
            info!("Saved attachment: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Last path component with anything outside `[A-Za-z0-9._-]` replaced
pub fn safe_file_name(name: &str, index: usize) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        format!("attachment-{}", index + 1)
    } else {
        cleaned.to_string()
    }
}
