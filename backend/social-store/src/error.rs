/// Error types for social-store
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Person {person_id} already has a profile")]
    DuplicateProfile { person_id: i64 },

    #[error("Person {person_id} cannot be deleted: referenced by {post_count} post(s) as author")]
    RestrictedDelete { person_id: i64, post_count: i64 },

    #[error("Field '{field}' is too long: {actual} characters (max {max})")]
    FieldTooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// True for errors caused by the request itself: a relation or length
    /// rule was violated, or a referenced row does not exist. False for
    /// database, migration and other infrastructure failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::DuplicateProfile { .. }
                | ServiceError::RestrictedDelete { .. }
                | ServiceError::FieldTooLong { .. }
                | ServiceError::NotFound { .. }
        )
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
