//! Lead access service — authorization-scoped CRUD over leads.

use funnel_core::error::{FunnelError, FunnelResult};
use funnel_core::identity::Identity;
use funnel_core::models::lead::{CreateLead, Lead, UpdateLead};
use funnel_core::repository::{AgentRepository, LeadRepository, PaginatedResult, Pagination};
use funnel_core::scope::LeadScope;
use tracing::warn;
use uuid::Uuid;

use crate::notify::{LeadCreated, LeadNotifier};

/// Authorization-scoped lead operations.
///
/// Generic over repository implementations so that the service layer
/// has no dependency on the database crate. Guards run in a fixed
/// order on every operation: authenticate, then role, then scope, then
/// execute. All checks live inside the service; the outer layer is not
/// trusted to pre-filter.
pub struct LeadService<L, A, N>
where
    L: LeadRepository,
    A: AgentRepository,
    N: LeadNotifier,
{
    leads: L,
    agents: A,
    notifier: N,
}

impl<L, A, N> LeadService<L, A, N>
where
    L: LeadRepository,
    A: AgentRepository,
    N: LeadNotifier,
{
    pub fn new(leads: L, agents: A, notifier: N) -> Self {
        Self {
            leads,
            agents,
            notifier,
        }
    }

    /// List the leads visible to the caller.
    pub async fn list_leads(
        &self,
        identity: Option<&Identity>,
        pagination: Pagination,
    ) -> FunnelResult<PaginatedResult<Lead>> {
        let identity = authenticate(identity)?;
        let scope = LeadScope::for_identity(identity);
        self.leads.list(&scope, pagination).await
    }

    /// Fetch a single lead visible to the caller.
    ///
    /// Out-of-scope ids report NotFound, never Forbidden, so record
    /// existence is not revealed across organizations.
    pub async fn get_lead(&self, identity: Option<&Identity>, id: Uuid) -> FunnelResult<Lead> {
        let identity = authenticate(identity)?;
        let scope = LeadScope::for_identity(identity);
        self.leads.get(&scope, id).await
    }

    /// Create a lead owned by the organizer's organization.
    ///
    /// The owning organization is stamped from the identity; the
    /// payload cannot choose one. Fires the notification hook after the
    /// write has committed.
    pub async fn create_lead(
        &self,
        identity: Option<&Identity>,
        input: CreateLead,
    ) -> FunnelResult<Lead> {
        let identity = authenticate(identity)?;
        let organization_id = require_organizer(identity, "create")?;

        input.validate()?;
        if let Some(agent_id) = input.agent_id {
            self.require_agent_in_org(organization_id, agent_id).await?;
        }

        let lead = self.leads.create(organization_id, input).await?;

        // Best-effort: the lead is already persisted, and delivery
        // failure must not undo or fail the create.
        let event = LeadCreated {
            lead_id: lead.id,
            organization_id: lead.organization_id,
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
        };
        if let Err(err) = self.notifier.notify(&event).await {
            warn!(lead_id = %lead.id, error = %err, "lead-created notification failed");
        }

        Ok(lead)
    }

    /// Apply a patch to a lead in the organizer's organization.
    ///
    /// Ids outside the organization report NotFound; the scope
    /// predicate travels with the mutation statement.
    pub async fn update_lead(
        &self,
        identity: Option<&Identity>,
        id: Uuid,
        patch: UpdateLead,
    ) -> FunnelResult<Lead> {
        let identity = authenticate(identity)?;
        let organization_id = require_organizer(identity, "update")?;

        patch.validate()?;
        if let Some(Some(agent_id)) = patch.agent_id {
            self.require_agent_in_org(organization_id, agent_id).await?;
        }

        self.leads
            .update(&LeadScope::Organization(organization_id), id, patch)
            .await
    }

    /// Delete a lead in the organizer's organization.
    pub async fn delete_lead(&self, identity: Option<&Identity>, id: Uuid) -> FunnelResult<()> {
        let identity = authenticate(identity)?;
        let organization_id = require_organizer(identity, "delete")?;

        self.leads
            .delete(&LeadScope::Organization(organization_id), id)
            .await
    }

    /// Reject assignments to agents outside the organization.
    async fn require_agent_in_org(&self, organization_id: Uuid, agent_id: Uuid) -> FunnelResult<()> {
        match self.agents.get_by_id(organization_id, agent_id).await {
            Ok(_) => Ok(()),
            Err(FunnelError::NotFound { .. }) => Err(FunnelError::Validation {
                message: format!("agent {agent_id} does not belong to the organization"),
            }),
            Err(other) => Err(other),
        }
    }
}

/// Unauthenticated callers are rejected before any query executes.
fn authenticate(identity: Option<&Identity>) -> FunnelResult<&Identity> {
    identity.ok_or(FunnelError::Unauthenticated)
}

/// Organizer-only gate for create, update, and delete. Agents have
/// read and list access only; this must not be loosened.
fn require_organizer(identity: &Identity, operation: &str) -> FunnelResult<Uuid> {
    match identity {
        Identity::Organizer {
            organization_id, ..
        } => Ok(*organization_id),
        Identity::Agent { .. } => Err(FunnelError::Forbidden {
            reason: format!("only organizers may {operation} leads"),
        }),
    }
}
