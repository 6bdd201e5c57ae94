//! Funnel Core — domain models, identity and scoping, and repository
//! trait definitions.
//!
//! This crate provides:
//! - The error taxonomy ([`error::FunnelError`], [`error::FunnelResult`])
//! - The identity and role model ([`identity::Identity`])
//! - The organization scoping resolver ([`scope::LeadScope`])
//! - Repository traits implemented by `funnel-db`

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
pub mod scope;
