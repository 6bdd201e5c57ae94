//! Lead domain model and payload validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FunnelError, FunnelResult};

const MAX_NAME_LEN: usize = 100;

/// A prospect record owned by an organization, optionally assigned to
/// one of its agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    /// Owning organization. Set at creation, immutable thereafter.
    pub organization_id: Uuid,
    /// Assigned agent, if any. `None` means unassigned.
    pub agent_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Free-form label (e.g., `new`, `contacted`). Opaque data; no
    /// transition rules apply.
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a lead.
///
/// Carries no organization: the owning organization always comes from
/// the creating organizer's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLead {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    /// Optional initial assignment; must reference an agent of the
    /// creating organizer's organization.
    pub agent_id: Option<Uuid>,
}

/// Patch for updating a lead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateLead {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    /// `Some(Some(id))` = assign, `Some(None)` = unassign, `None` = no change.
    pub agent_id: Option<Option<Uuid>>,
}

fn require_name(field: &str, value: &str) -> FunnelResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FunnelError::Validation {
            message: format!("{field} must not be blank"),
        });
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(FunnelError::Validation {
            message: format!("{field} must be at most {MAX_NAME_LEN} characters"),
        });
    }
    Ok(())
}

fn require_nonblank(field: &str, value: &str) -> FunnelResult<()> {
    if value.trim().is_empty() {
        return Err(FunnelError::Validation {
            message: format!("{field} must not be blank"),
        });
    }
    Ok(())
}

fn check_email(value: &str) -> FunnelResult<()> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    };
    if !valid {
        return Err(FunnelError::Validation {
            message: format!("invalid email address: {value}"),
        });
    }
    Ok(())
}

impl CreateLead {
    /// Validate the payload before it reaches storage.
    pub fn validate(&self) -> FunnelResult<()> {
        require_name("first_name", &self.first_name)?;
        require_name("last_name", &self.last_name)?;
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(phone) = &self.phone {
            require_nonblank("phone", phone)?;
        }
        if let Some(category) = &self.category {
            require_nonblank("category", category)?;
        }
        Ok(())
    }
}

impl UpdateLead {
    /// Validate the patch; only present fields are checked.
    pub fn validate(&self) -> FunnelResult<()> {
        if let Some(first_name) = &self.first_name {
            require_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_name("last_name", last_name)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(phone) = &self.phone {
            require_nonblank("phone", phone)?;
        }
        if let Some(category) = &self.category {
            require_nonblank("category", category)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateLead {
        CreateLead {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: None,
            phone: None,
            category: None,
            agent_id: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn blank_first_name_rejected() {
        let mut input = payload();
        input.first_name = "   ".into();

        let err = input.validate().unwrap_err();
        assert!(matches!(err, FunnelError::Validation { .. }));
    }

    #[test]
    fn overlong_last_name_rejected() {
        let mut input = payload();
        input.last_name = "x".repeat(MAX_NAME_LEN + 1);

        assert!(input.validate().is_err());
    }

    #[test]
    fn email_without_domain_rejected() {
        let mut input = payload();
        input.email = Some("jane@".into());

        assert!(input.validate().is_err());

        input.email = Some("jane@example.com".into());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_checks_only_present_fields() {
        let patch = UpdateLead {
            category: Some("contacted".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let bad = UpdateLead {
            first_name: Some("".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
