use log::{ error, info, warn };
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ ConfigError, Secret, ServiceConfig };
use crate::errors::{ NotifyError, PipelineError, PipelineResult };
use crate::implementations::artifact_builder::ArtifactBuilder;
use crate::implementations::attachment_store::AttachmentStore;
use crate::implementations::audit::AuditLog;
use crate::implementations::evaluator_notifier::EvaluatorNotifier;
use crate::implementations::generation_client::GenerationClient;
use crate::implementations::github_host::GitHubHost;
use crate::implementations::providers::{ HuggingFaceProvider, OpenAiCompatibleProvider };
use crate::implementations::publisher::{ describe, RepositoryPublisher };
use crate::implementations::validator::{ RequestValidator, ValidationError };
use crate::models::generation::GenerationResult;
use crate::models::notification::{ CompletionReport, NotificationOutcome, ReportStatus };
use crate::models::outcome::{ PipelineResponse, PipelineStage, SuccessResponse };
use crate::models::repository::PublishReceipt;
use crate::models::request::GenerationRequest;
use crate::traits::completion_notifier::CompletionNotifier;

/// Tracks the current stage of one run and only ever moves it forward
#[derive(Debug, Clone)]
pub struct PipelineRun {
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Validating,
            history: vec![PipelineStage::Validating],
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Move to `next`. Backwards or repeated transitions are refused.
    pub fn advance(&mut self, next: PipelineStage) -> bool {
        if next <= self.stage {
            error!("Refusing pipeline transition {} -> {}", self.stage, next);
            return false;
        }
        info!("Pipeline stage: {} -> {}", self.stage, next);
        self.stage = next;
        self.history.push(next);
        true
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

/// What the publish stages hand to the notification stage
struct Published {
    generation: GenerationResult,
    receipt: PublishReceipt,
}

/// Sequences validation, generation, building, publishing and notification.
///
/// Every call to [`Pipeline::run`] ends in exactly one [`PipelineResponse`].
#[derive(Clone)]
pub struct Pipeline {
    validator: RequestValidator,
    generator: GenerationClient,
    builder: ArtifactBuilder,
    publisher: RepositoryPublisher,
    notifier: Arc<dyn CompletionNotifier>,
    default_evaluator_url: Option<String>,
    staging: Option<AttachmentStore>,
    audit: Option<AuditLog>,
}

impl Pipeline {
    pub fn new(
        validator: RequestValidator,
        generator: GenerationClient,
        builder: ArtifactBuilder,
        publisher: RepositoryPublisher,
        notifier: Arc<dyn CompletionNotifier>
    ) -> Self {
        Self {
            validator,
            generator,
            builder,
            publisher,
            notifier,
            default_evaluator_url: None,
            staging: None,
            audit: None,
        }
    }

    /// Evaluator used when a request does not name one
    pub fn with_evaluator_url(mut self, url: Option<String>) -> Self {
        self.default_evaluator_url = url;
        self
    }

    pub fn with_staging(mut self, store: AttachmentStore) -> Self {
        self.staging = Some(store);
        self
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Wire up the production components from validated configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let missing = config.missing_values();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |secret: &Option<Secret>, name: &'static str| {
            secret.clone().ok_or(ConfigError::Missing(vec![name]))
        };
        let owner = config.github.owner.clone().ok_or(ConfigError::Missing(vec!["BASE_REPO_OWNER"]))?;

        let primary = OpenAiCompatibleProvider::new(
            &config.primary,
            required(&config.primary.api_key, "AIPIPE_API_KEY")?
        ).map_err(|e| ConfigError::Invalid { field: "primary", message: e.to_string() })?;
        let fallback = HuggingFaceProvider::new(
            &config.fallback,
            required(&config.fallback.api_key, "HUGGINGFACE_API_KEY")?
        ).map_err(|e| ConfigError::Invalid { field: "fallback", message: e.to_string() })?;
        let host = GitHubHost::new(
            &config.github,
            required(&config.github.token, "GITHUB_TOKEN")?
        ).map_err(|e| ConfigError::Invalid { field: "github", message: e.to_string() })?;
        let notifier = EvaluatorNotifier::new(Duration::from_secs(config.evaluator.timeout_secs)).map_err(
            |e| ConfigError::Invalid { field: "evaluator", message: e.to_string() }
        )?;

        let mut pipeline = Self::new(
            RequestValidator::new(&required(&config.app_secret, "APP_SECRET")?),
            GenerationClient::new(Arc::new(primary), Arc::new(fallback)),
            ArtifactBuilder::new(owner.clone()),
            RepositoryPublisher::new(Arc::new(host), owner),
            Arc::new(notifier)
        )
            .with_evaluator_url(config.evaluator.url.clone())
            .with_staging(AttachmentStore::new(config.staging_dir.clone()));
        if let Some(path) = &config.audit_log {
            pipeline = pipeline.with_audit_log(AuditLog::new(path.clone()));
        }
        Ok(pipeline)
    }

    /// Run over a raw request body
    pub async fn run_bytes(&self, body: &[u8]) -> PipelineResponse {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => self.run(&payload).await,
            Err(e) => {
                let err: PipelineError = ValidationError::Malformed(
                    format!("request body is not valid JSON: {}", e)
                ).into();
                warn!("Rejected request: {}", err);
                PipelineResponse::failure(PipelineStage::Validating, &err)
            }
        }
    }

    /// Run one request to its terminal response
    pub async fn run(&self, payload: &Value) -> PipelineResponse {
        let mut run = PipelineRun::new();
        if let Some(audit) = &self.audit {
            audit.record(payload);
        }

        // Nothing leaves the process for a request that fails here
        let request = match self.validator.validate(payload) {
            Ok(request) => request,
            Err(e) => {
                let err = PipelineError::from(e);
                warn!("Rejected request: {}", err);
                return PipelineResponse::failure(run.stage(), &err);
            }
        };
        info!("Accepted request {} for repository {}", request.id, request.repo_name);

        match self.publish_stages(&mut run, &request).await {
            Ok(published) => {
                run.advance(PipelineStage::Notifying);
                let report = success_report(&request, &published.receipt);
                let notification = self.notify(&request, &report).await;
                run.advance(PipelineStage::Done);

                let receipt = published.receipt;
                PipelineResponse::Success(SuccessResponse {
                    repo_name: receipt.repository.name,
                    repository_url: receipt.repository.html_url,
                    site_url: receipt.site_url,
                    commit_sha: receipt.commit_sha,
                    provider: published.generation.provider,
                    fallback_used: published.generation.fallback_used,
                    notification,
                })
            }
            Err(err) => {
                let failed_stage = run.stage();
                error!("Request {} failed while {}: {}", request.id, failed_stage, err);

                run.advance(PipelineStage::Notifying);
                let report = failure_report(&request, failed_stage, &err);
                let notification = self.notify(&request, &report).await;
                run.advance(PipelineStage::Done);

                let mut response = PipelineResponse::failure(failed_stage, &err);
                if let PipelineResponse::Failure(failure) = &mut response {
                    failure.notification = Some(notification);
                }
                response
            }
        }
    }

    async fn publish_stages(&self, run: &mut PipelineRun, request: &GenerationRequest) -> PipelineResult<Published> {
        run.advance(PipelineStage::Generating);
        self.stage_attachments(request);
        let prompt = self.generator.render_prompt(&request.brief, &request.checks);
        let generation = self.generator.generate(&prompt).await?;
        if generation.fallback_used {
            warn!("Request {} is using fallback output from {}", request.id, generation.provider);
        }

        run.advance(PipelineStage::Building);
        let files = self.builder.build(&generation, request)?;

        run.advance(PipelineStage::Publishing);
        let message = format!(
            "Generate site for {} (round {})",
            request.requester.task.as_deref().unwrap_or(&request.repo_name),
            request.requester.round
        );
        let receipt = self.publisher.publish(&request.repo_name, &describe(&request.brief), &files, &message).await?;

        Ok(Published { generation, receipt })
    }

    fn stage_attachments(&self, request: &GenerationRequest) {
        let Some(store) = &self.staging else {
            return;
        };
        // Attachments are inert, so a staging failure does not stop the run
        if let Err(e) = store.stage(&request.id, &request.attachments) {
            warn!("{}", e);
        }
    }

    async fn notify(&self, request: &GenerationRequest, report: &CompletionReport) -> NotificationOutcome {
        let target = match request.evaluation_url.as_ref().or(self.default_evaluator_url.as_ref()) {
            Some(target) => target,
            None => {
                info!("No evaluator configured, skipping notification");
                return NotificationOutcome::undelivered(None, "no evaluator configured");
            }
        };

        match self.notifier.notify(target, report).await {
            Ok(status) => NotificationOutcome::delivered(status),
            Err(e) => {
                let status = match &e {
                    NotifyError::Rejected { status } => Some(*status),
                    _ => None,
                };
                let err = PipelineError::from(e);
                warn!("{} (outcome unchanged)", err);
                NotificationOutcome::undelivered(status, err.to_string())
            }
        }
    }
}

fn success_report(request: &GenerationRequest, receipt: &PublishReceipt) -> CompletionReport {
    CompletionReport {
        status: ReportStatus::Succeeded,
        email: request.requester.email.clone(),
        task: request.requester.task.clone(),
        round: request.requester.round,
        nonce: request.requester.nonce.clone(),
        repo_url: Some(receipt.repository.html_url.clone()),
        commit_sha: Some(receipt.commit_sha.clone()),
        pages_url: Some(receipt.site_url.clone()),
        stage: None,
        error_kind: None,
        message: None,
    }
}

fn failure_report(request: &GenerationRequest, stage: PipelineStage, err: &PipelineError) -> CompletionReport {
    CompletionReport {
        status: ReportStatus::Failed,
        email: request.requester.email.clone(),
        task: request.requester.task.clone(),
        round: request.requester.round,
        nonce: request.requester.nonce.clone(),
        repo_url: err.repository().map(|r| r.html_url.clone()),
        commit_sha: None,
        pages_url: None,
        stage: Some(stage),
        error_kind: Some(err.kind()),
        message: Some(err.to_string()),
    }
}
