//! Shared bootstrap for social-store integration tests.
//!
//! Every test gets its own in-memory SQLite database with migrations applied.

#![allow(dead_code)]

use social_store::domain::models::{NewPerson, NewPost, NewProfile, Person, Post, Profile};
use social_store::{Config, SocialStore};

pub async fn setup_test_store() -> SocialStore {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("social_store=debug")
        .try_init();

    SocialStore::connect(&Config::in_memory())
        .await
        .expect("in-memory store with migrations")
}

pub async fn create_person(store: &SocialStore, name: &str) -> Person {
    store
        .persons()
        .create(NewPerson::new(name))
        .await
        .expect("create person")
}

pub async fn create_profile(store: &SocialStore, person_id: i64, phone: &str) -> Profile {
    store
        .profiles()
        .create(NewProfile::new(person_id, phone))
        .await
        .expect("create profile")
}

pub async fn create_post(store: &SocialStore, title: &str, author_id: i64) -> Post {
    store
        .posts()
        .create(NewPost::new(title, author_id))
        .await
        .expect("create post")
}
