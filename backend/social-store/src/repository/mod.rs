pub mod likes;
pub mod persons;
pub mod posts;
pub mod profiles;

pub use likes::LikeRepository;
pub use persons::PersonRepository;
pub use posts::PostRepository;
pub use profiles::ProfileRepository;

use crate::error::{ServiceError, ServiceResult};
use sqlx::SqliteConnection;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false)
}

/// Reject negative pagination before it reaches SQLite, where a negative
/// LIMIT means "no limit".
pub(crate) fn check_page(limit: i64, offset: i64) -> ServiceResult<()> {
    if limit < 0 || offset < 0 {
        return Err(ServiceError::InvalidInput(format!(
            "limit and offset must be non-negative (limit={}, offset={})",
            limit, offset
        )));
    }
    Ok(())
}

pub(crate) async fn person_exists(conn: &mut SqliteConnection, person_id: i64) -> ServiceResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM persons WHERE id = ?1")
        .bind(person_id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

pub(crate) async fn post_exists(conn: &mut SqliteConnection, post_id: i64) -> ServiceResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = ?1")
        .bind(post_id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}
