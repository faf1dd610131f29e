use async_trait::async_trait;
use log::{ debug, info, warn };
use std::time::Duration;

use crate::errors::NotifyError;
use crate::models::notification::CompletionReport;
use crate::traits::completion_notifier::CompletionNotifier;

/// Posts completion reports to the evaluator webhook as JSON
#[derive(Clone)]
pub struct EvaluatorNotifier {
    http_client: reqwest::Client,
}

impl EvaluatorNotifier {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let http_client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .user_agent(concat!("pagesmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::Unreachable(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl CompletionNotifier for EvaluatorNotifier {
    async fn notify(&self, target: &str, report: &CompletionReport) -> Result<u16, NotifyError> {
        debug!("Posting {:?} report to {}", report.status, target);

        let response = self.http_client.post(target).json(report).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            warn!("Evaluator at {} answered HTTP {}", target, status);
            return Err(NotifyError::Rejected { status });
        }

        info!("Callback sent successfully to {}", target);
        Ok(status)
    }
}
