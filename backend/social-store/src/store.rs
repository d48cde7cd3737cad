use crate::config::Config;
use crate::error::ServiceResult;
use crate::repository::{LikeRepository, PersonRepository, PostRepository, ProfileRepository};
use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

/// Embedded schema migrations for persons, profiles, posts and likes
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Entry point bundling the pool with one repository per entity
#[derive(Clone)]
pub struct SocialStore {
    pool: SqlitePool,
    persons: PersonRepository,
    profiles: ProfileRepository,
    posts: PostRepository,
    likes: LikeRepository,
}

impl SocialStore {
    /// Create the pool described by `config` and, unless disabled, apply migrations
    pub async fn connect(config: &Config) -> ServiceResult<Self> {
        config.database.log_config();
        let pool = db_pool::create_pool(config.database.clone()).await?;

        if config.app.run_migrations {
            db_pool::migrate(&pool, &MIGRATOR).await?;
        }

        info!(env = %config.app.env, "Social store ready");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool; the schema must already be in place
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            persons: PersonRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            likes: LikeRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn persons(&self) -> &PersonRepository {
        &self.persons
    }

    pub fn profiles(&self) -> &ProfileRepository {
        &self.profiles
    }

    pub fn posts(&self) -> &PostRepository {
        &self.posts
    }

    pub fn likes(&self) -> &LikeRepository {
        &self.likes
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
