//! Lead service configuration.

/// Configuration for lead-created notification delivery.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Webhook endpoint that receives `LeadCreated` events as JSON.
    /// `None` disables delivery.
    pub endpoint: Option<String>,
    /// Optional bearer token sent with each delivery.
    pub auth_token: Option<String>,
    /// Per-delivery timeout in seconds (default: 5).
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_token: None,
            timeout_secs: 5,
        }
    }
}
