use async_trait::async_trait;

use crate::errors::NotifyError;
use crate::models::notification::CompletionReport;

/// Delivers the terminal outcome of a run to an external evaluator
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    /// Send one report to `target`. Returns the HTTP status on acceptance.
    async fn notify(&self, target: &str, report: &CompletionReport) -> Result<u16, NotifyError>;
}
