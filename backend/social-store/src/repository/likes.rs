use crate::config::SERVICE_NAME;
use crate::domain::models::{Person, PersonLikePost, Post};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{person_exists, post_exists};
use db_pool::acquire_with_metrics;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Repository for the person <-> post "like" association
///
/// None of these operations touch `posts.likes`; the counter and the
/// association are independent.
#[derive(Clone)]
pub struct LikeRepository {
    pool: SqlitePool,
}

impl LikeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a like (idempotent - returns success if already exists)
    /// Returns (PersonLikePost, was_created) where was_created is true if this is a new like
    pub async fn add_like(
        &self,
        person_id: i64,
        post_id: i64,
    ) -> ServiceResult<(PersonLikePost, bool)> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;

        if !person_exists(&mut tx, person_id).await? {
            return Err(ServiceError::not_found("person", person_id));
        }
        if !post_exists(&mut tx, post_id).await? {
            return Err(ServiceError::not_found("post", post_id));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO person_like_posts (person_id, post_id)
            VALUES (?1, ?2)
            ON CONFLICT (person_id, post_id) DO NOTHING
            "#,
        )
        .bind(person_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        let like = sqlx::query_as::<_, PersonLikePost>(
            r#"
            SELECT id, person_id, post_id
            FROM person_like_posts
            WHERE person_id = ?1 AND post_id = ?2
            "#,
        )
        .bind(person_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let was_created = inserted.rows_affected() > 0;
        if was_created {
            info!(person_id, post_id, "Like added");
        } else {
            debug!(person_id, post_id, "Like already present");
        }
        Ok((like, was_created))
    }

    /// Delete a like (idempotent - returns false if it did not exist)
    pub async fn remove_like(&self, person_id: i64, post_id: i64) -> ServiceResult<bool> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let result = sqlx::query(
            r#"
            DELETE FROM person_like_posts
            WHERE person_id = ?1 AND post_id = ?2
            "#,
        )
        .bind(person_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let removed = result.rows_affected() > 0;
        debug!(person_id, post_id, removed, "Like removal processed");
        Ok(removed)
    }

    /// Check if person has liked a post
    pub async fn has_liked(&self, person_id: i64, post_id: i64) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM person_like_posts
                WHERE person_id = ?1 AND post_id = ?2
            )
            "#,
        )
        .bind(person_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Posts liked by a person, in the order the likes were recorded
    pub async fn liked_posts(&self, person_id: i64) -> ServiceResult<Vec<Post>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME).await?;
        if !person_exists(&mut conn, person_id).await? {
            return Err(ServiceError::not_found("person", person_id));
        }

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.likes, p.created_by_id
            FROM person_like_posts l
            JOIN posts p ON p.id = l.post_id
            WHERE l.person_id = ?1
            ORDER BY l.id
            "#,
        )
        .bind(person_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(posts)
    }

    /// Persons who like a post, in the order the likes were recorded
    pub async fn liking_persons(&self, post_id: i64) -> ServiceResult<Vec<Person>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME).await?;
        if !post_exists(&mut conn, post_id).await? {
            return Err(ServiceError::not_found("post", post_id));
        }

        let persons = sqlx::query_as::<_, Person>(
            r#"
            SELECT pe.id, pe.name
            FROM person_like_posts l
            JOIN persons pe ON pe.id = l.person_id
            WHERE l.post_id = ?1
            ORDER BY l.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(persons)
    }

    /// Number of persons liking a post.
    ///
    /// Read-only view of the association; it is never written back to
    /// `posts.likes`.
    pub async fn like_set_size(&self, post_id: i64) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM person_like_posts
            WHERE post_id = ?1
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Drop every like a person has given; returns how many were removed
    pub async fn clear_likes_for_person(&self, person_id: i64) -> ServiceResult<u64> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let result = sqlx::query("DELETE FROM person_like_posts WHERE person_id = ?1")
            .bind(person_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let removed = result.rows_affected();
        info!(person_id, removed, "Cleared likes for person");
        Ok(removed)
    }
}
