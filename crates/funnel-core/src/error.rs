//! Error types for the Funnel system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FunnelError {
    /// No authenticated identity accompanied the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but the role does not permit the operation.
    #[error("operation not permitted: {reason}")]
    Forbidden { reason: String },

    /// Covers both ids that do not exist and ids outside the caller's
    /// scope; the two cases are indistinguishable to callers.
    #[error("entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type FunnelResult<T> = Result<T, FunnelError>;
