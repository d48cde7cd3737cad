use crate::domain::models::{validate_input, NewPost, Post, PostUpdate};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{check_page, is_foreign_key_violation, person_exists};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Repository for Post operations
///
/// The `likes` column is a plain counter. Nothing here reads or writes the
/// like association table except the cascade on delete.
#[derive(Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new post; `likes` falls back to the column default (0)
    pub async fn create(&self, input: NewPost) -> ServiceResult<Post> {
        validate_input(&input)?;
        let author_id = input.created_by_id;

        let mut tx = db_pool::begin_immediate(&self.pool).await?;

        if !person_exists(&mut tx, author_id).await? {
            return Err(ServiceError::not_found("person", author_id));
        }

        let insert = match input.likes {
            Some(likes) => sqlx::query_as::<_, Post>(
                r#"
                INSERT INTO posts (title, created_by_id, likes)
                VALUES (?1, ?2, ?3)
                RETURNING id, title, likes, created_by_id
                "#,
            )
            .bind(&input.title)
            .bind(author_id)
            .bind(likes),
            None => sqlx::query_as::<_, Post>(
                r#"
                INSERT INTO posts (title, created_by_id)
                VALUES (?1, ?2)
                RETURNING id, title, likes, created_by_id
                "#,
            )
            .bind(&input.title)
            .bind(author_id),
        };

        let post = insert.fetch_one(&mut *tx).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                ServiceError::not_found("person", author_id)
            } else {
                ServiceError::Database(e)
            }
        })?;
        tx.commit().await?;

        info!(post_id = post.id, created_by_id = author_id, "Post created");
        Ok(post)
    }

    pub async fn find(&self, post_id: i64) -> ServiceResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, likes, created_by_id
            FROM posts
            WHERE id = ?1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn get(&self, post_id: i64) -> ServiceResult<Post> {
        self.find(post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("post", post_id))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> ServiceResult<Vec<Post>> {
        check_page(limit, offset)?;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, likes, created_by_id
            FROM posts
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Posts authored by a person, oldest first
    pub async fn list_by_creator(&self, person_id: i64) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, likes, created_by_id
            FROM posts
            WHERE created_by_id = ?1
            ORDER BY id
            "#,
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(person_id, count = posts.len(), "Listed posts by creator");
        Ok(posts)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_creator(&self, person_id: i64) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE created_by_id = ?1")
            .bind(person_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Change title and/or counter. The author cannot be reassigned.
    pub async fn update(&self, post_id: i64, update: PostUpdate) -> ServiceResult<Post> {
        validate_input(&update)?;

        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE(?1, title),
                likes = COALESCE(?2, likes)
            WHERE id = ?3
            RETURNING id, title, likes, created_by_id
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.likes)
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::not_found("post", post_id))?;
        tx.commit().await?;

        debug!(post_id, "Post updated");
        Ok(post)
    }

    /// Add `delta` (may be negative) to the raw counter
    pub async fn increment_likes(&self, post_id: i64, delta: i32) -> ServiceResult<Post> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;

        let current: i32 = sqlx::query_scalar("SELECT likes FROM posts WHERE id = ?1")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::not_found("post", post_id))?;

        let next = current.checked_add(delta).ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "likes counter overflow on post {} ({} + {})",
                post_id, current, delta
            ))
        })?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET likes = ?1
            WHERE id = ?2
            RETURNING id, title, likes, created_by_id
            "#,
        )
        .bind(next)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(post_id, likes = post.likes, delta, "Post like counter adjusted");
        Ok(post)
    }

    /// Delete a post; its like associations are removed by cascade
    pub async fn delete(&self, post_id: i64) -> ServiceResult<()> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("post", post_id));
        }
        tx.commit().await?;

        info!(post_id, "Post deleted");
        Ok(())
    }
}
