//! Funnel Leads — the authorization-scoped lead access service and the
//! lead-created notification hook.

pub mod config;
pub mod notify;
pub mod service;

pub use config::NotifyConfig;
pub use notify::{LeadCreated, LeadNotifier, NotifyError, NullNotifier, WebhookNotifier};
pub use service::LeadService;
