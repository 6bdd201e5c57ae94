//! Organization scoping resolver.
//!
//! Every lead query is bounded by a [`LeadScope`] derived from the
//! caller's identity. The scope is re-derived on every call and never
//! cached across requests, so role or membership changes take effect
//! immediately.

use uuid::Uuid;

use crate::identity::Identity;

/// The authorization predicate bounding which leads are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadScope {
    /// Every lead owned by the organization (organizer access).
    Organization(Uuid),
    /// Leads owned by the organization AND assigned to the agent whose
    /// user is `user_id`; both conditions must hold.
    AssignedAgent {
        organization_id: Uuid,
        user_id: Uuid,
    },
}

impl LeadScope {
    /// Resolve the scope for an identity.
    ///
    /// The match is exhaustive over [`Identity`]: a new role variant
    /// will not compile until its predicate is decided here, so there
    /// is no fail-open fallthrough. Unauthenticated callers never reach
    /// the resolver; they are rejected by the service precondition.
    pub fn for_identity(identity: &Identity) -> Self {
        match identity {
            Identity::Organizer {
                organization_id, ..
            } => LeadScope::Organization(*organization_id),
            Identity::Agent {
                user_id,
                organization_id,
                ..
            } => LeadScope::AssignedAgent {
                organization_id: *organization_id,
                user_id: *user_id,
            },
        }
    }

    /// The organization the scope is bounded to.
    pub fn organization_id(&self) -> Uuid {
        match self {
            LeadScope::Organization(organization_id)
            | LeadScope::AssignedAgent {
                organization_id, ..
            } => *organization_id,
        }
    }
}
