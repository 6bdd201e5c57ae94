//! Authenticated identity and role model.
//!
//! An [`Identity`] is built by the outer request layer from verified
//! session state, never from client-supplied role or organization
//! claims. An organizer's owning organization is direct; an agent's is
//! reached through its agent record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::agent::Agent;

/// An authenticated principal, tagged with exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    /// Full management rights over the organization's leads and agents.
    Organizer {
        user_id: Uuid,
        organization_id: Uuid,
    },
    /// Read-only access to leads assigned to this agent within its
    /// organization.
    Agent {
        user_id: Uuid,
        agent_id: Uuid,
        organization_id: Uuid,
    },
}

impl Identity {
    pub fn organizer(user_id: Uuid, organization_id: Uuid) -> Self {
        Identity::Organizer {
            user_id,
            organization_id,
        }
    }

    /// Build an agent identity from its agent record.
    pub fn for_agent(agent: &Agent) -> Self {
        Identity::Agent {
            user_id: agent.user_id,
            agent_id: agent.id,
            organization_id: agent.organization_id,
        }
    }

    /// The organization this identity belongs to.
    pub fn organization_id(&self) -> Uuid {
        match self {
            Identity::Organizer {
                organization_id, ..
            }
            | Identity::Agent {
                organization_id, ..
            } => *organization_id,
        }
    }

    /// The authenticated user behind this identity.
    pub fn user_id(&self) -> Uuid {
        match self {
            Identity::Organizer { user_id, .. } | Identity::Agent { user_id, .. } => *user_id,
        }
    }

    pub fn is_organizer(&self) -> bool {
        matches!(self, Identity::Organizer { .. })
    }
}
