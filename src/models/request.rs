use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

/// An attachment as it arrives on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_base64: String,
}

/// Inbound request body before validation.
///
/// The secret is not part of this struct: it is checked on the raw JSON
/// before anything else is looked at.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGenerationRequest {
    #[serde(default, alias = "prompt")]
    pub brief: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub round: Option<u32>,

    #[serde(default)]
    pub nonce: Option<String>,

    #[serde(default)]
    pub checks: Option<Vec<String>>,

    #[serde(default)]
    pub evaluation_url: Option<String>,

    #[serde(default)]
    pub repo_name: Option<String>,

    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// Who asked for the generation. Echoed back to the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Requester {
    pub email: Option<String>,
    pub task: Option<String>,
    pub round: u32,
    pub nonce: Option<String>,
}

/// An attachment whose base64 body has already been decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A request that passed authentication and field validation.
///
/// Attachments are carried along so they can be staged, but they are never
/// part of the prompt sent to a provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: String,
    pub brief: String,
    pub repo_name: String,
    pub checks: Vec<String>,
    pub requester: Requester,
    pub evaluation_url: Option<String>,
    pub attachments: Vec<DecodedAttachment>,
    pub received_at: DateTime<Utc>,
}
