use crate::domain::models::{validate_input, NewProfile, Profile, ProfileUpdate};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{is_unique_violation, person_exists};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// The unique index on `profiles.person_id` backs the explicit duplicate check
fn map_insert_error(err: sqlx::Error, person_id: i64) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::DuplicateProfile { person_id }
    } else {
        ServiceError::Database(err)
    }
}

/// Repository for Profile operations
///
/// A person owns at most one profile; the owner is fixed at creation.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewProfile) -> ServiceResult<Profile> {
        validate_input(&input)?;
        let person_id = input.person_id;

        let mut tx = db_pool::begin_immediate(&self.pool).await?;

        if !person_exists(&mut tx, person_id).await? {
            return Err(ServiceError::not_found("person", person_id));
        }

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM profiles WHERE person_id = ?1")
                .bind(person_id)
                .fetch_optional(&mut *tx)
                .await?;
        if let Some(profile_id) = existing {
            warn!(person_id, profile_id, "Person already has a profile");
            return Err(ServiceError::DuplicateProfile { person_id });
        }

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (person_id, phone)
            VALUES (?1, ?2)
            RETURNING id, person_id, phone
            "#,
        )
        .bind(person_id)
        .bind(&input.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, person_id))?;

        tx.commit().await?;

        info!(profile_id = profile.id, person_id, "Profile created");
        Ok(profile)
    }

    pub async fn find(&self, profile_id: i64) -> ServiceResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, person_id, phone
            FROM profiles
            WHERE id = ?1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get(&self, profile_id: i64) -> ServiceResult<Profile> {
        self.find(profile_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("profile", profile_id))
    }

    /// The profile of a person, if they have one
    pub async fn find_by_person(&self, person_id: i64) -> ServiceResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, person_id, phone
            FROM profiles
            WHERE person_id = ?1
            "#,
        )
        .bind(person_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(person_id, found = profile.is_some(), "Looked up profile by person");
        Ok(profile)
    }

    pub async fn update(&self, profile_id: i64, update: ProfileUpdate) -> ServiceResult<Profile> {
        validate_input(&update)?;

        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET phone = COALESCE(?1, phone)
            WHERE id = ?2
            RETURNING id, person_id, phone
            "#,
        )
        .bind(update.phone.as_deref())
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::not_found("profile", profile_id))?;
        tx.commit().await?;

        debug!(profile_id, "Profile updated");
        Ok(profile)
    }

    pub async fn delete(&self, profile_id: i64) -> ServiceResult<()> {
        let mut tx = db_pool::begin_immediate(&self.pool).await?;
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("profile", profile_id));
        }
        tx.commit().await?;

        info!(profile_id, "Profile deleted");
        Ok(())
    }
}
