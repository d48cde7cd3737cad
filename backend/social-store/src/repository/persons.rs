use crate::domain::models::{validate_input, NewPerson, Person, PersonDeletion, PersonUpdate};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{check_page, is_foreign_key_violation, person_exists};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// `ON DELETE RESTRICT` on `posts.created_by_id` backs the explicit post count
fn map_delete_error(err: sqlx::Error, person_id: i64, post_count: i64) -> ServiceError {
    if is_foreign_key_violation(&err) {
        ServiceError::RestrictedDelete {
            person_id,
            post_count: post_count.max(1),
        }
    } else {
        ServiceError::Database(err)
    }
}

/// Repository for Person operations
#[derive(Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
}

impl PersonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new person. Over-long names are rejected, not truncated.
    pub async fn create(&self, input: NewPerson) -> ServiceResult<Person> {
        validate_input(&input)?;

        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let person = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO persons (name)
            VALUES (?1)
            RETURNING id, name
            "#,
        )
        .bind(&input.name)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(person_id = person.id, "Person created");
        Ok(person)
    }

    pub async fn find(&self, person_id: i64) -> ServiceResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, name
            FROM persons
            WHERE id = ?1
            "#,
        )
        .bind(person_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    pub async fn get(&self, person_id: i64) -> ServiceResult<Person> {
        self.find(person_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("person", person_id))
    }

    /// Page through persons ordered by id
    pub async fn list(&self, limit: i64, offset: i64) -> ServiceResult<Vec<Person>> {
        check_page(limit, offset)?;

        let persons = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, name
            FROM persons
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = persons.len(), limit, offset, "Listed persons");
        Ok(persons)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM persons")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update(&self, person_id: i64, update: PersonUpdate) -> ServiceResult<Person> {
        validate_input(&update)?;

        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let person = sqlx::query_as::<_, Person>(
            r#"
            UPDATE persons
            SET name = COALESCE(?1, name)
            WHERE id = ?2
            RETURNING id, name
            "#,
        )
        .bind(update.name.as_deref())
        .bind(person_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::not_found("person", person_id))?;
        tx.commit().await?;

        debug!(person_id, "Person updated");
        Ok(person)
    }

    /// Delete a person together with their profile and like associations.
    ///
    /// Fails with [`ServiceError::RestrictedDelete`] while any post names the
    /// person as author; in that case the transaction is rolled back and no
    /// row is touched.
    pub async fn delete(&self, person_id: i64) -> ServiceResult<PersonDeletion> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;

        if !person_exists(&mut tx, person_id).await? {
            return Err(ServiceError::not_found("person", person_id));
        }

        let post_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE created_by_id = ?1")
                .bind(person_id)
                .fetch_one(&mut *tx)
                .await?;
        if post_count > 0 {
            warn!(person_id, post_count, "Refusing to delete person who authored posts");
            return Err(ServiceError::RestrictedDelete {
                person_id,
                post_count,
            });
        }

        let profiles_removed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE person_id = ?1")
                .bind(person_id)
                .fetch_one(&mut *tx)
                .await?;
        let likes_removed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM person_like_posts WHERE person_id = ?1")
                .bind(person_id)
                .fetch_one(&mut *tx)
                .await?;

        // Profile and like rows follow via ON DELETE CASCADE
        sqlx::query("DELETE FROM persons WHERE id = ?1")
            .bind(person_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_delete_error(e, person_id, post_count))?;

        tx.commit().await?;

        let deletion = PersonDeletion {
            person_id,
            profiles_removed: profiles_removed as u64,
            likes_removed: likes_removed as u64,
        };
        info!(
            person_id,
            profiles_removed = deletion.profiles_removed,
            likes_removed = deletion.likes_removed,
            "Person deleted"
        );
        Ok(deletion)
    }
}
