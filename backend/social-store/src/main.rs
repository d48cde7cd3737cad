use anyhow::{Context, Result};
use social_store::logging::init_tracing;
use social_store::{Config, SocialStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.app.log_format);

    info!("🔧 Starting social-store");

    let store = SocialStore::connect(&config)
        .await
        .context("Failed to open social store")?;

    let persons = store
        .persons()
        .count()
        .await
        .context("Failed to count persons")?;
    let posts = store
        .posts()
        .count()
        .await
        .context("Failed to count posts")?;

    info!(persons, posts, "Schema verified");

    store.close().await;
    Ok(())
}
