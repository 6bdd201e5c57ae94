//! Agent domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An agent works leads on behalf of exactly one organization.
///
/// Each agent is tied one-to-one to an authenticated user; assigned
/// leads are matched back to an agent-role identity through that user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// The authenticated user behind this agent (one-to-one).
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgent {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}
