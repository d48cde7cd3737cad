//! Integration Tests: concurrent writers on a file-backed store
//!
//! Several connections race the same write; the outcome must be the same as
//! running the calls one after another.

mod common;

use common::{create_person, create_post};
use db_pool::DbConfig;
use social_store::config::SERVICE_NAME;
use social_store::domain::models::NewProfile;
use social_store::{Config, ServiceError, SocialStore};
use tempfile::TempDir;

const WRITERS: usize = 8;

async fn setup_file_store() -> (SocialStore, TempDir) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("social_store=debug")
        .try_init();

    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::in_memory();
    config.database = DbConfig {
        service_name: SERVICE_NAME.to_string(),
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("social.db").display()),
        max_connections: WRITERS as u32,
        min_connections: 1,
        metrics_interval_secs: 0,
        ..DbConfig::default()
    };

    let store = SocialStore::connect(&config)
        .await
        .expect("file-backed store with migrations");
    (store, dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_add_like_creates_exactly_one_row() {
    let (store, _dir) = setup_file_store().await;
    let author = create_person(&store, "Author").await;
    let fan = create_person(&store, "Fan").await;

    for round in 0..5 {
        let post = create_post(&store, &format!("Post {}", round), author.id).await;
        let (fan_id, post_id) = (fan.id, post.id);

        let mut handles = Vec::new();
        for _ in 0..WRITERS {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.likes().add_like(fan_id, post_id).await
            }));
        }

        let mut created = 0;
        let mut like_ids = Vec::new();
        for handle in handles {
            let (like, was_created) = handle.await.unwrap().expect("add_like");
            if was_created {
                created += 1;
            }
            like_ids.push(like.id);
        }

        assert_eq!(created, 1, "round {}", round);
        like_ids.dedup();
        assert_eq!(like_ids.len(), 1, "round {}", round);
        assert_eq!(store.likes().like_set_size(post.id).await.unwrap(), 1);
        assert_eq!(store.posts().get(post.id).await.unwrap().likes, 0);
    }

    store.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_profile_create_yields_one_profile() {
    let (store, _dir) = setup_file_store().await;

    for round in 0..5 {
        let person_id = create_person(&store, &format!("Person {}", round)).await.id;

        let mut handles = Vec::new();
        for i in 0..WRITERS {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .profiles()
                    .create(NewProfile::new(person_id, format!("555{}", i)))
                    .await
            }));
        }

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(profile) => {
                    assert_eq!(profile.person_id, person_id);
                    created += 1;
                }
                Err(ServiceError::DuplicateProfile { person_id: dup }) => {
                    assert_eq!(dup, person_id);
                    duplicates += 1;
                }
                Err(other) => panic!("unexpected error in round {}: {}", round, other),
            }
        }

        assert_eq!(created, 1, "round {}", round);
        assert_eq!(duplicates, WRITERS - 1, "round {}", round);
    }

    store.close().await;
}
