//! SurrealDB repository implementations.

mod agent;
mod lead;
mod organization;

pub use agent::SurrealAgentRepository;
pub use lead::SurrealLeadRepository;
pub use organization::SurrealOrganizationRepository;
