use async_trait::async_trait;
use chrono::Utc;
use log::{ debug, info, warn };
use reqwest::{ Method, StatusCode };
use serde_json::{ json, Value };
use std::time::Duration;

use crate::config::{ GitHubConfig, Secret };
use crate::errors::{ truncate, HostError };
use crate::models::artifact::FileSet;
use crate::models::repository::{ NewRepository, PublishedRepository };
use crate::traits::repository_host::RepositoryHost;

const API_VERSION: &str = "2022-11-28";

/// GitHub REST API v3 client for repository creation, commits and Pages
#[derive(Clone)]
pub struct GitHubHost {
    api_url: String,
    token: Secret,
    owner_is_org: bool,
    default_branch: String,
    http_client: reqwest::Client,
}

impl GitHubHost {
    pub fn new(config: &GitHubConfig, token: Secret) -> Result<Self, HostError> {
        let http_client = reqwest::Client
            ::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pagesmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            owner_is_org: config.owner_is_org,
            default_branch: config.default_branch.clone(),
            http_client,
        })
    }

    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, HostError> {
        let url = format!("{}{}", self.api_url, path);
        debug!("GitHub {} {}", method, path);

        let mut request = self.http_client
            .request(method, &url)
            .bearer_auth(self.token.expose())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.trim() == "0");
        let text = response.text().await?;

        if !status.is_success() {
            warn!("GitHub API error on {}: HTTP {}", path, status.as_u16());
            return Err(classify_failure(status, rate_limit_exhausted, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HostError::MalformedResponse(format!("{}: {}", path, e)))
    }

    fn repo_path(repository: &PublishedRepository) -> String {
        format!("/repos/{}/{}", repository.owner, repository.name)
    }
}

/// Map a failed GitHub response onto the host error taxonomy
pub fn classify_failure(status: StatusCode, rate_limit_exhausted: bool, body: &str) -> HostError {
    let message = serde_json
        ::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let base = v["message"].as_str()?.to_string();
            let details: Vec<String> = v["errors"]
                .as_array()
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(|e| e["message"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            Some(if details.is_empty() { base } else { format!("{} ({})", base, details.join("; ")) })
        })
        .unwrap_or_else(|| truncate(body, 300));

    match status.as_u16() {
        401 => HostError::Unauthorized(message),
        403 if rate_limit_exhausted => HostError::RateLimited(message),
        403 if message.to_ascii_lowercase().contains("rate limit") => HostError::RateLimited(message),
        403 => HostError::Unauthorized(message),
        404 => HostError::NotFound(message),
        422 if message.to_ascii_lowercase().contains("already exists") => HostError::AlreadyExists(message),
        429 => HostError::RateLimited(message),
        code => HostError::Http { status: code, message },
    }
}

fn str_field<'a>(value: &'a Value, pointer: &str) -> Result<&'a str, HostError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| HostError::MalformedResponse(format!("missing {}", pointer)))
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn create_repository(&self, request: &NewRepository) -> Result<PublishedRepository, HostError> {
        info!("Creating repository {}/{}", request.owner, request.name);
        let path = if self.owner_is_org {
            format!("/orgs/{}/repos", request.owner)
        } else {
            "/user/repos".to_string()
        };
        let body =
            json!({
            "name": request.name,
            "description": request.description,
            "private": false,
            "auto_init": true
        });

        let created = match self.call(Method::POST, &path, Some(&body)).await {
            Err(HostError::AlreadyExists(_)) => {
                return Err(HostError::AlreadyExists(format!("{}/{}", request.owner, request.name)));
            }
            other => other?,
        };

        Ok(PublishedRepository {
            name: str_field(&created, "/name")?.to_string(),
            owner: str_field(&created, "/owner/login")?.to_string(),
            html_url: str_field(&created, "/html_url")?.to_string(),
            default_branch: created["default_branch"]
                .as_str()
                .unwrap_or(&self.default_branch)
                .to_string(),
            site_url: None,
            created_at: Utc::now(),
        })
    }

    async fn push_files(
        &self,
        repository: &PublishedRepository,
        files: &FileSet,
        message: &str
    ) -> Result<String, HostError> {
        let repo = Self::repo_path(repository);
        let branch = &repository.default_branch;
        info!("Committing {} files to {}:{}", files.len(), repository.name, branch);

        let head = self.call(Method::GET, &format!("{}/git/ref/heads/{}", repo, branch), None).await?;
        let parent_sha = str_field(&head, "/object/sha")?.to_string();

        let parent = self.call(Method::GET, &format!("{}/git/commits/{}", repo, parent_sha), None).await?;
        let base_tree = str_field(&parent, "/tree/sha")?.to_string();

        let entries: Vec<Value> = files
            .iter()
            .map(|f| json!({ "path": f.path, "mode": "100644", "type": "blob", "content": f.content }))
            .collect();
        let tree = self.call(
            Method::POST,
            &format!("{}/git/trees", repo),
            Some(&json!({ "base_tree": base_tree, "tree": entries }))
        ).await?;
        let tree_sha = str_field(&tree, "/sha")?.to_string();

        let commit = self.call(
            Method::POST,
            &format!("{}/git/commits", repo),
            Some(&json!({ "message": message, "tree": tree_sha, "parents": [parent_sha] }))
        ).await?;
        let commit_sha = str_field(&commit, "/sha")?.to_string();

        self.call(
            Method::PATCH,
            &format!("{}/git/refs/heads/{}", repo, branch),
            Some(&json!({ "sha": commit_sha, "force": false }))
        ).await?;

        info!("Pushed commit {} to {}", commit_sha, repository.name);
        Ok(commit_sha)
    }

    async fn enable_site(&self, repository: &PublishedRepository) -> Result<String, HostError> {
        let repo = Self::repo_path(repository);
        info!("Enabling Pages for {} from {}:/", repository.name, repository.default_branch);

        let body = json!({ "source": { "branch": repository.default_branch, "path": "/" } });
        let pages = match self.call(Method::POST, &format!("{}/pages", repo), Some(&body)).await {
            // Already enabled: report what is being served
            Err(HostError::Http { status: 409, .. }) => {
                self.call(Method::GET, &format!("{}/pages", repo), None).await?
            }
            other => other?,
        };

        Ok(
            pages["html_url"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| default_site_url(&repository.owner, &repository.name))
        )
    }
}

/// `https://<owner>.github.io/<name>/`
pub fn default_site_url(owner: &str, name: &str) -> String {
    format!("https://{}.github.io/{}/", owner.to_ascii_lowercase(), name)
}
