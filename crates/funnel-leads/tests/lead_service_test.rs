//! Integration tests for the lead access service.
//!
//! The service is wired to real SurrealDB repositories over the
//! in-memory engine, so scoping is exercised end-to-end down to the
//! queries.

use std::sync::{Arc, Mutex};

use funnel_core::error::FunnelError;
use funnel_core::identity::Identity;
use funnel_core::models::agent::CreateAgent;
use funnel_core::models::lead::{CreateLead, Lead, UpdateLead};
use funnel_core::models::organization::CreateOrganization;
use funnel_core::repository::{
    AgentRepository, OrganizationRepository, PaginatedResult, Pagination,
};
use funnel_db::repository::{
    SurrealAgentRepository, SurrealLeadRepository, SurrealOrganizationRepository,
};
use funnel_leads::{LeadCreated, LeadNotifier, LeadService, NotifyError};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Notifier that records every delivered event.
#[derive(Clone, Default)]
struct RecordingNotifier {
    events: Arc<Mutex<Vec<LeadCreated>>>,
}

impl LeadNotifier for RecordingNotifier {
    async fn notify(&self, event: &LeadCreated) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Notifier that fails every delivery.
struct FailingNotifier;

impl LeadNotifier for FailingNotifier {
    async fn notify(&self, _event: &LeadCreated) -> Result<(), NotifyError> {
        Err(NotifyError::Status(500))
    }
}

type Service<N> = LeadService<SurrealLeadRepository<Db>, SurrealAgentRepository<Db>, N>;

struct Fixture {
    svc: Service<RecordingNotifier>,
    events: Arc<Mutex<Vec<LeadCreated>>>,
    /// Organizer of Acme.
    o1: Identity,
    /// Organizer of Globex.
    o2: Identity,
    /// Agent of Acme (assigned agent in the scenario).
    a1: Identity,
    acme_agent_id: Uuid,
    globex_agent_id: Uuid,
    db: Surreal<Db>,
}

/// Spin up in-memory DB, run migrations, create the two-organization
/// scenario: Acme with organizer O1 and agent A1, Globex with
/// organizer O2 (and an agent for cross-tenant assignment tests).
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    funnel_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let acme = org_repo
        .create(CreateOrganization {
            name: "Acme".into(),
            slug: "acme".into(),
        })
        .await
        .unwrap();
    let globex = org_repo
        .create(CreateOrganization {
            name: "Globex".into(),
            slug: "globex".into(),
        })
        .await
        .unwrap();

    let agent_repo = SurrealAgentRepository::new(db.clone());
    let acme_agent = agent_repo
        .create(CreateAgent {
            organization_id: acme.id,
            user_id: Uuid::new_v4(),
            name: "Alex".into(),
            email: "alex@acme.test".into(),
        })
        .await
        .unwrap();
    let globex_agent = agent_repo
        .create(CreateAgent {
            organization_id: globex.id,
            user_id: Uuid::new_v4(),
            name: "Greta".into(),
            email: "greta@globex.test".into(),
        })
        .await
        .unwrap();

    let notifier = RecordingNotifier::default();
    let events = notifier.events.clone();
    let svc = LeadService::new(
        SurrealLeadRepository::new(db.clone()),
        SurrealAgentRepository::new(db.clone()),
        notifier,
    );

    Fixture {
        svc,
        events,
        o1: Identity::organizer(Uuid::new_v4(), acme.id),
        o2: Identity::organizer(Uuid::new_v4(), globex.id),
        a1: Identity::for_agent(&acme_agent),
        acme_agent_id: acme_agent.id,
        globex_agent_id: globex_agent.id,
        db,
    }
}

fn payload(first: &str, last: &str) -> CreateLead {
    CreateLead {
        first_name: first.into(),
        last_name: last.into(),
        email: None,
        phone: None,
        category: None,
        agent_id: None,
    }
}

fn names(page: &PaginatedResult<Lead>) -> Vec<String> {
    let mut names: Vec<String> = page.items.iter().map(|l| l.first_name.clone()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn create_then_get_round_trip() {
    let fx = setup().await;

    let created = fx
        .svc
        .create_lead(
            Some(&fx.o1),
            CreateLead {
                email: Some("jane@example.com".into()),
                category: Some("new".into()),
                ..payload("Jane", "Doe")
            },
        )
        .await
        .unwrap();

    // Organization comes from the identity, not the payload.
    assert_eq!(created.organization_id, fx.o1.organization_id());

    let fetched = fx.svc.get_lead(Some(&fx.o1), created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.first_name, "Jane");
    assert_eq!(fetched.last_name, "Doe");
    assert_eq!(fetched.email.as_deref(), Some("jane@example.com"));
    assert_eq!(fetched.category.as_deref(), Some("new"));

    // Exactly one notification, for this lead.
    let events = fx.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].lead_id, created.id);
    assert_eq!(events[0].organization_id, created.organization_id);
}

#[tokio::test]
async fn organizer_get_requires_same_organization() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    // The other organizer sees NotFound, not Forbidden; record
    // existence is not revealed across organizations.
    let err = fx.svc.get_lead(Some(&fx.o2), lead.id).await.unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn agent_get_requires_assignment_and_same_organization() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    // Unassigned: invisible to the agent.
    let err = fx.svc.get_lead(Some(&fx.a1), lead.id).await.unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }));

    // Assigned to this agent: visible.
    fx.svc
        .update_lead(
            Some(&fx.o1),
            lead.id,
            UpdateLead {
                agent_id: Some(Some(fx.acme_agent_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(fx.svc.get_lead(Some(&fx.a1), lead.id).await.is_ok());
}

#[tokio::test]
async fn list_returns_exactly_the_scoped_subset() {
    let fx = setup().await;

    fx.svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();
    fx.svc
        .create_lead(Some(&fx.o1), payload("John", "Smith"))
        .await
        .unwrap();
    fx.svc
        .create_lead(Some(&fx.o2), payload("Hank", "Scorpio"))
        .await
        .unwrap();

    let acme = fx
        .svc
        .list_leads(Some(&fx.o1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(names(&acme), vec!["Jane".to_string(), "John".to_string()]);

    let globex = fx
        .svc
        .list_leads(Some(&fx.o2), Pagination::default())
        .await
        .unwrap();
    assert_eq!(names(&globex), vec!["Hank".to_string()]);
}

#[tokio::test]
async fn agent_create_is_forbidden_and_persists_nothing() {
    let fx = setup().await;

    let err = fx
        .svc
        .create_lead(Some(&fx.a1), payload("Jane", "Doe"))
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Forbidden { .. }), "got: {err:?}");

    // Nothing persisted, no notification fired.
    let page = fx
        .svc
        .list_leads(Some(&fx.o1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(fx.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn agent_mutations_are_forbidden_even_when_assigned() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(
            Some(&fx.o1),
            CreateLead {
                agent_id: Some(fx.acme_agent_id),
                ..payload("Jane", "Doe")
            },
        )
        .await
        .unwrap();

    // The lead is in the agent's scope for reads...
    assert!(fx.svc.get_lead(Some(&fx.a1), lead.id).await.is_ok());

    // ...but update and delete are organizer-only.
    let err = fx
        .svc
        .update_lead(
            Some(&fx.a1),
            lead.id,
            UpdateLead {
                category: Some("stolen".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Forbidden { .. }));

    let err = fx.svc.delete_lead(Some(&fx.a1), lead.id).await.unwrap_err();
    assert!(matches!(err, FunnelError::Forbidden { .. }));
}

#[tokio::test]
async fn unauthenticated_callers_are_rejected() {
    let fx = setup().await;
    let id = Uuid::new_v4();

    let err = fx.svc.list_leads(None, Pagination::default()).await.unwrap_err();
    assert!(matches!(err, FunnelError::Unauthenticated));

    let err = fx.svc.get_lead(None, id).await.unwrap_err();
    assert!(matches!(err, FunnelError::Unauthenticated));

    let err = fx
        .svc
        .create_lead(None, payload("Jane", "Doe"))
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Unauthenticated));

    let err = fx
        .svc
        .update_lead(None, id, UpdateLead::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Unauthenticated));

    let err = fx.svc.delete_lead(None, id).await.unwrap_err();
    assert!(matches!(err, FunnelError::Unauthenticated));
}

#[tokio::test]
async fn update_outside_organization_is_not_found() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    let err = fx
        .svc
        .update_lead(
            Some(&fx.o2),
            lead.id,
            UpdateLead {
                last_name: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }), "got: {err:?}");

    let fetched = fx.svc.get_lead(Some(&fx.o1), lead.id).await.unwrap();
    assert_eq!(fetched.last_name, "Doe");
}

#[tokio::test]
async fn delete_outside_organization_is_not_found() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    let err = fx.svc.delete_lead(Some(&fx.o2), lead.id).await.unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }), "got: {err:?}");

    assert!(fx.svc.get_lead(Some(&fx.o1), lead.id).await.is_ok());
}

#[tokio::test]
async fn acme_globex_scenario() {
    let fx = setup().await;

    // O1 creates "Jane Doe", unassigned.
    let jane = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    let o1_page = fx
        .svc
        .list_leads(Some(&fx.o1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(names(&o1_page), vec!["Jane".to_string()]);

    let a1_page = fx
        .svc
        .list_leads(Some(&fx.a1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(a1_page.total, 0, "unassigned lead must be invisible to the agent");

    // O1 assigns Jane Doe to A1.
    fx.svc
        .update_lead(
            Some(&fx.o1),
            jane.id,
            UpdateLead {
                agent_id: Some(Some(fx.acme_agent_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let a1_page = fx
        .svc
        .list_leads(Some(&fx.a1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(names(&a1_page), vec!["Jane".to_string()]);

    let o2_page = fx
        .svc
        .list_leads(Some(&fx.o2), Pagination::default())
        .await
        .unwrap();
    assert_eq!(o2_page.total, 0);

    // The assigned agent still cannot delete.
    let err = fx.svc.delete_lead(Some(&fx.a1), jane.id).await.unwrap_err();
    assert!(matches!(err, FunnelError::Forbidden { .. }));

    // The owning organizer can.
    fx.svc.delete_lead(Some(&fx.o1), jane.id).await.unwrap();
    let o1_page = fx
        .svc
        .list_leads(Some(&fx.o1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(o1_page.total, 0);
}

#[tokio::test]
async fn cross_organization_agent_assignment_rejected() {
    let fx = setup().await;

    // At creation time.
    let err = fx
        .svc
        .create_lead(
            Some(&fx.o1),
            CreateLead {
                agent_id: Some(fx.globex_agent_id),
                ..payload("Jane", "Doe")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Validation { .. }), "got: {err:?}");

    // And at update time.
    let lead = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();
    let err = fx
        .svc
        .update_lead(
            Some(&fx.o1),
            lead.id,
            UpdateLead {
                agent_id: Some(Some(fx.globex_agent_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Validation { .. }));
}

#[tokio::test]
async fn unassignment_hides_the_lead_from_the_agent_again() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(
            Some(&fx.o1),
            CreateLead {
                agent_id: Some(fx.acme_agent_id),
                ..payload("Jane", "Doe")
            },
        )
        .await
        .unwrap();
    assert!(fx.svc.get_lead(Some(&fx.a1), lead.id).await.is_ok());

    fx.svc
        .update_lead(
            Some(&fx.o1),
            lead.id,
            UpdateLead {
                agent_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = fx.svc.get_lead(Some(&fx.a1), lead.id).await.unwrap_err();
    assert!(matches!(err, FunnelError::NotFound { .. }));
}

#[tokio::test]
async fn invalid_payload_rejected_before_persisting() {
    let fx = setup().await;

    let err = fx
        .svc
        .create_lead(Some(&fx.o1), payload("   ", "Doe"))
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Validation { .. }));

    let page = fx
        .svc
        .list_leads(Some(&fx.o1), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(fx.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_patch_rejected() {
    let fx = setup().await;

    let lead = fx
        .svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    let err = fx
        .svc
        .update_lead(
            Some(&fx.o1),
            lead.id,
            UpdateLead {
                email: Some("not-an-email".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Validation { .. }));

    let fetched = fx.svc.get_lead(Some(&fx.o1), lead.id).await.unwrap();
    assert_eq!(fetched.email, None);
}

#[tokio::test]
async fn notifier_failure_does_not_fail_create() {
    let fx = setup().await;

    // A second service over the same store, with a notifier that
    // always fails.
    let svc = LeadService::new(
        SurrealLeadRepository::new(fx.db.clone()),
        SurrealAgentRepository::new(fx.db.clone()),
        FailingNotifier,
    );

    let lead = svc
        .create_lead(Some(&fx.o1), payload("Jane", "Doe"))
        .await
        .unwrap();

    // The lead is persisted despite the failed delivery.
    assert!(svc.get_lead(Some(&fx.o1), lead.id).await.is_ok());
}
