//! Database-specific error types and conversions.

use funnel_core::error::FunnelError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Statement failed: {0}")]
    Query(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for FunnelError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FunnelError::NotFound { entity, id },
            other => FunnelError::Database(other.to_string()),
        }
    }
}
