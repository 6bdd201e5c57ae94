//! SurrealDB implementation of [`LeadRepository`].
//!
//! The [`LeadScope`] is compiled into a WHERE fragment that rides in
//! the same statement as the read or mutation it bounds. For update and
//! delete this means there is no separate existence check: a lead
//! outside the scope and a lead that does not exist both produce zero
//! rows, and both surface as NotFound.

use chrono::{DateTime, Utc};
use funnel_core::error::FunnelResult;
use funnel_core::models::lead::{CreateLead, Lead, UpdateLead};
use funnel_core::repository::{LeadRepository, PaginatedResult, Pagination};
use funnel_core::scope::LeadScope;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct LeadRow {
    organization_id: String,
    agent_id: Option<String>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct LeadRowWithId {
    record_id: String,
    organization_id: String,
    agent_id: Option<String>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_agent_id(agent_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    agent_id
        .map(|raw| {
            Uuid::parse_str(&raw).map_err(|e| DbError::Decode(format!("invalid agent UUID: {e}")))
        })
        .transpose()
}

impl LeadRow {
    fn into_lead(self, id: Uuid) -> Result<Lead, DbError> {
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))?;
        Ok(Lead {
            id,
            organization_id,
            agent_id: parse_agent_id(self.agent_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl LeadRowWithId {
    fn try_into_lead(self) -> Result<Lead, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))?;
        Ok(Lead {
            id,
            organization_id,
            agent_id: parse_agent_id(self.agent_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// WHERE fragment for a scope. Binds `$scope_org`, and for the agent
/// arm `$scope_user` as well.
///
/// The agent arm re-derives assignment through the agent table inside
/// the query itself: a lead counts as visible only when its agent_id
/// belongs to an agent of the same organization whose user is the
/// caller. Unassigned leads (`agent_id = NONE`) never match.
fn scope_where(scope: &LeadScope) -> &'static str {
    match scope {
        LeadScope::Organization(_) => "organization_id = $scope_org",
        LeadScope::AssignedAgent { .. } => {
            "organization_id = $scope_org AND agent_id IN \
             (SELECT VALUE meta::id(id) FROM agent \
              WHERE organization_id = $scope_org \
              AND user_id = $scope_user)"
        }
    }
}

/// SurrealDB implementation of the Lead repository.
#[derive(Clone)]
pub struct SurrealLeadRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLeadRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LeadRepository for SurrealLeadRepository<C> {
    async fn create(&self, organization_id: Uuid, input: CreateLead) -> FunnelResult<Lead> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('lead', $id) SET \
                 organization_id = $organization_id, \
                 agent_id = $agent_id, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 email = $email, \
                 phone = $phone, \
                 category = $category",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("agent_id", input.agent_id.map(|a| a.to_string())))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("category", input.category))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LeadRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lead".into(),
            id: id_str,
        })?;

        Ok(row.into_lead(id)?)
    }

    async fn get(&self, scope: &LeadScope, id: Uuid) -> FunnelResult<Lead> {
        let id_str = id.to_string();
        let query = format!(
            "SELECT * FROM type::record('lead', $id) WHERE {}",
            scope_where(scope)
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("scope_org", scope.organization_id().to_string()));
        if let LeadScope::AssignedAgent { user_id, .. } = scope {
            builder = builder.bind(("scope_user", user_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<LeadRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lead".into(),
            id: id_str,
        })?;

        Ok(row.into_lead(id)?)
    }

    async fn list(
        &self,
        scope: &LeadScope,
        pagination: Pagination,
    ) -> FunnelResult<PaginatedResult<Lead>> {
        let scope_org = scope.organization_id().to_string();

        let count_query = format!(
            "SELECT count() AS total FROM lead WHERE {} GROUP ALL",
            scope_where(scope)
        );
        let mut count_builder = self
            .db
            .query(&count_query)
            .bind(("scope_org", scope_org.clone()));
        if let LeadScope::AssignedAgent { user_id, .. } = scope {
            count_builder = count_builder.bind(("scope_user", user_id.to_string()));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM lead \
             WHERE {} \
             ORDER BY created_at ASC \
             LIMIT $limit START $offset",
            scope_where(scope)
        );
        let mut builder = self
            .db
            .query(&page_query)
            .bind(("scope_org", scope_org))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let LeadScope::AssignedAgent { user_id, .. } = scope {
            builder = builder.bind(("scope_user", user_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<LeadRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_lead())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(&self, scope: &LeadScope, id: Uuid, input: UpdateLead) -> FunnelResult<Lead> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.category.is_some() {
            sets.push("category = $category");
        }
        if input.agent_id.is_some() {
            sets.push("agent_id = $agent_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('lead', $id) SET {} WHERE {}",
            sets.join(", "),
            scope_where(scope)
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("scope_org", scope.organization_id().to_string()));
        if let LeadScope::AssignedAgent { user_id, .. } = scope {
            builder = builder.bind(("scope_user", user_id.to_string()));
        }

        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(category) = input.category {
            builder = builder.bind(("category", category));
        }
        if let Some(agent_id) = input.agent_id {
            // agent_id is Option<Option<Uuid>>: Some(Some(v)) = assign,
            // Some(None) = unassign.
            builder = builder.bind(("agent_id", agent_id.map(|a| a.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LeadRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lead".into(),
            id: id_str,
        })?;

        Ok(row.into_lead(id)?)
    }

    async fn delete(&self, scope: &LeadScope, id: Uuid) -> FunnelResult<()> {
        let id_str = id.to_string();
        let query = format!(
            "DELETE type::record('lead', $id) WHERE {} RETURN BEFORE",
            scope_where(scope)
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("scope_org", scope.organization_id().to_string()));
        if let LeadScope::AssignedAgent { user_id, .. } = scope {
            builder = builder.bind(("scope_user", user_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<LeadRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "lead".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
