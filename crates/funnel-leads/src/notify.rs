//! Lead-created notification hook.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::NotifyConfig;

/// Event emitted after a lead has been persisted.
#[derive(Debug, Clone, Serialize)]
pub struct LeadCreated {
    pub lead_id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Notification delivery error.
///
/// Never surfaced to the caller of a create operation; the service
/// logs it and moves on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned status {0}")]
    Status(u16),
}

/// Fire-and-forget hook invoked after a successful lead creation.
///
/// Implementations are best-effort: a failed delivery leaves the
/// persisted lead untouched.
pub trait LeadNotifier: Send + Sync {
    fn notify(&self, event: &LeadCreated) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier that drops every event.
#[derive(Debug, Clone, Default)]
pub struct NullNotifier;

impl LeadNotifier for NullNotifier {
    async fn notify(&self, _event: &LeadCreated) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Delivers [`LeadCreated`] events as JSON POSTs to a configured
/// endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    config: NotifyConfig,
}

impl WebhookNotifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl LeadNotifier for WebhookNotifier {
    async fn notify(&self, event: &LeadCreated) -> Result<(), NotifyError> {
        let Some(endpoint) = &self.config.endpoint else {
            // Delivery disabled.
            return Ok(());
        };

        let mut request = self
            .client
            .post(endpoint)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(event);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
