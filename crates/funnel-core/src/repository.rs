//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lead queries are bounded by a
//! [`LeadScope`]; organization and agent operations take the owning
//! organization id directly.

use uuid::Uuid;

use crate::error::FunnelResult;
use crate::models::agent::{Agent, CreateAgent};
use crate::models::lead::{CreateLead, Lead, UpdateLead};
use crate::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use crate::scope::LeadScope;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = FunnelResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FunnelResult<Organization>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = FunnelResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = FunnelResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = FunnelResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = FunnelResult<PaginatedResult<Organization>>> + Send;
}

pub trait AgentRepository: Send + Sync {
    fn create(&self, input: CreateAgent) -> impl Future<Output = FunnelResult<Agent>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FunnelResult<Agent>> + Send;
    /// Look up the agent record behind an authenticated user.
    fn get_by_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = FunnelResult<Agent>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FunnelResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FunnelResult<PaginatedResult<Agent>>> + Send;
}

pub trait LeadRepository: Send + Sync {
    /// Persist a new lead owned by `organization_id`.
    fn create(
        &self,
        organization_id: Uuid,
        input: CreateLead,
    ) -> impl Future<Output = FunnelResult<Lead>> + Send;

    /// Fetch a lead by id within the scope. Out-of-scope ids are
    /// indistinguishable from absent ones.
    fn get(&self, scope: &LeadScope, id: Uuid) -> impl Future<Output = FunnelResult<Lead>> + Send;

    fn list(
        &self,
        scope: &LeadScope,
        pagination: Pagination,
    ) -> impl Future<Output = FunnelResult<PaginatedResult<Lead>>> + Send;

    /// Apply a patch to a lead within the scope. Implementations must
    /// apply the scope predicate in the same statement as the mutation.
    fn update(
        &self,
        scope: &LeadScope,
        id: Uuid,
        input: UpdateLead,
    ) -> impl Future<Output = FunnelResult<Lead>> + Send;

    /// Delete a lead within the scope; ids matching no record inside
    /// the scope report NotFound.
    fn delete(&self, scope: &LeadScope, id: Uuid)
    -> impl Future<Output = FunnelResult<()>> + Send;
}
