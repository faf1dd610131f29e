use log::{ debug, info };
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::fs;
use std::path::{ Path, PathBuf };
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// A credential. Never printed, never logged.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[redacted]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[redacted]")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Name used in logs and responses
    pub name: String,

    /// Full URL of the generation endpoint
    pub endpoint: String,

    pub model: String,

    /// Bearer credential
    pub api_key: Option<Secret>,

    pub timeout_secs: u64,

    pub max_tokens: u32,

    pub temperature: f32,
}

impl ProviderConfig {
    /// OpenAI-compatible chat completions through AI Pipe
    pub fn primary_default() -> Self {
        Self {
            name: "aipipe".to_string(),
            endpoint: "https://aipipe.org/openai/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 4096,
            temperature: 0.2,
        }
    }

    /// Hugging Face hosted inference with a small text model
    pub fn fallback_default() -> Self {
        Self {
            name: "huggingface".to_string(),
            endpoint: "https://api-inference.huggingface.co/models/gpt2".to_string(),
            model: "gpt2".to_string(),
            api_key: None,
            timeout_secs: 30,
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::primary_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,

    /// Token with repository contents and Pages scopes
    pub token: Option<Secret>,

    /// Account that owns every generated repository
    pub owner: Option<String>,

    /// Create repositories under an organization instead of the token's user
    pub owner_is_org: bool,

    pub default_branch: String,

    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            owner: None,
            owner_is_org: false,
            default_branch: "main".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Used when a request carries no `evaluation_url` of its own
    pub url: Option<String>,

    pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 15,
        }
    }
}

/// Process-wide configuration. Read-only once loaded.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    /// Shared secret every request must present
    pub app_secret: Option<Secret>,

    pub github: GitHubConfig,

    pub primary: ProviderConfig,

    pub fallback: ProviderConfig,

    pub evaluator: EvaluatorConfig,

    /// Where request attachments are written
    pub staging_dir: PathBuf,

    /// Append-only JSON lines log of inbound requests
    pub audit_log: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_secret: None,
            github: GitHubConfig::default(),
            primary: ProviderConfig::primary_default(),
            fallback: ProviderConfig::fallback_default(),
            evaluator: EvaluatorConfig::default(),
            staging_dir: std::env::temp_dir().join("pagesmith-uploads"),
            audit_log: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: ServiceConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// File (if any), then process environment. Not validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// [`ServiceConfig::resolve`], then validation
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::resolve(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) where F: Fn(&str) -> Option<String> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("APP_SECRET") {
            self.app_secret = Some(Secret::new(v));
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(Secret::new(v));
        }
        if let Some(v) = get("BASE_REPO_OWNER") {
            self.github.owner = Some(v);
        }
        if let Some(v) = get("GITHUB_API_URL") {
            self.github.api_url = v;
        }
        if let Some(v) = get("AIPIPE_API_KEY") {
            self.primary.api_key = Some(Secret::new(v));
        }
        if let Some(v) = get("HUGGINGFACE_API_KEY") {
            self.fallback.api_key = Some(Secret::new(v));
        }
        if let Some(v) = get("EVALUATOR_URL") {
            self.evaluator.url = Some(v);
        }
        if let Some(v) = get("PAGESMITH_STAGING_DIR") {
            self.staging_dir = PathBuf::from(v);
        }
        debug!("Applied environment overrides");
    }

    /// Names of required values that are still unset
    pub fn missing_values(&self) -> Vec<&'static str> {
        let unset = |s: &Option<Secret>| s.as_ref().map_or(true, Secret::is_empty);

        let mut missing = Vec::new();
        if unset(&self.app_secret) {
            missing.push("APP_SECRET");
        }
        if unset(&self.github.token) {
            missing.push("GITHUB_TOKEN");
        }
        if self.github.owner.as_deref().map_or(true, |o| o.trim().is_empty()) {
            missing.push("BASE_REPO_OWNER");
        }
        if unset(&self.primary.api_key) {
            missing.push("AIPIPE_API_KEY");
        }
        if unset(&self.fallback.api_key) {
            missing.push("HUGGINGFACE_API_KEY");
        }
        missing
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.missing_values();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        for (field, secs) in [
            ("primary.timeout_secs", self.primary.timeout_secs),
            ("fallback.timeout_secs", self.fallback.timeout_secs),
            ("github.timeout_secs", self.github.timeout_secs),
            ("evaluator.timeout_secs", self.evaluator.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "timeout must be at least one second".to_string(),
                });
            }
        }
        if self.github.default_branch.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "github.default_branch",
                message: "branch name is empty".to_string(),
            });
        }
        Ok(())
    }
}
