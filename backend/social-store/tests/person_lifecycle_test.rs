//! Integration Tests: Person lifecycle
//!
//! Coverage:
//! - Restrict-on-delete while the person authors posts
//! - Cascade of profile and like rows on a successful delete
//! - Field length rejection and NotFound handling

mod common;

use common::{create_person, create_post, create_profile, setup_test_store};
use social_store::domain::models::{NewPerson, PersonUpdate};
use social_store::ServiceError;

#[tokio::test]
async fn alice_scenario_restrict_then_cascade() {
    let store = setup_test_store().await;

    let alice = create_person(&store, "Alice").await;
    let profile = create_profile(&store, alice.id, "5551234").await;
    let post = create_post(&store, "Hello", alice.id).await;
    assert_eq!(post.likes, 0);

    // Authored post blocks the delete
    let err = store.persons().delete(alice.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::RestrictedDelete { person_id, post_count: 1 } if person_id == alice.id
    ));

    // Nothing was removed
    assert_eq!(store.persons().get(alice.id).await.unwrap(), alice);
    assert_eq!(store.profiles().get(profile.id).await.unwrap(), profile);
    assert_eq!(store.posts().get(post.id).await.unwrap(), post);

    store.posts().delete(post.id).await.unwrap();
    let deletion = store.persons().delete(alice.id).await.unwrap();
    assert_eq!(deletion.person_id, alice.id);
    assert_eq!(deletion.profiles_removed, 1);

    assert!(store.persons().find(alice.id).await.unwrap().is_none());
    assert!(store.profiles().find(profile.id).await.unwrap().is_none());
    assert!(store
        .profiles()
        .find_by_person(alice.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn restricted_delete_keeps_likes_and_profile() {
    let store = setup_test_store().await;

    let author = create_person(&store, "Author").await;
    let fan = create_person(&store, "Fan").await;
    create_profile(&store, author.id, "0001").await;
    let first = create_post(&store, "First", author.id).await;
    create_post(&store, "Second", author.id).await;
    store.likes().add_like(author.id, first.id).await.unwrap();
    store.likes().add_like(fan.id, first.id).await.unwrap();

    let err = store.persons().delete(author.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::RestrictedDelete { post_count: 2, .. }
    ));
    assert!(err.is_client_error());

    assert!(store.likes().has_liked(author.id, first.id).await.unwrap());
    assert_eq!(store.likes().like_set_size(first.id).await.unwrap(), 2);
    assert!(store
        .profiles()
        .find_by_person(author.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(store.posts().count_by_creator(author.id).await.unwrap(), 2);
}

#[tokio::test]
async fn delete_without_posts_removes_profile_and_likes() {
    let store = setup_test_store().await;

    let author = create_person(&store, "Author").await;
    let reader = create_person(&store, "Reader").await;
    create_profile(&store, reader.id, "12345").await;
    let post = create_post(&store, "Post", author.id).await;
    store.likes().add_like(reader.id, post.id).await.unwrap();

    let deletion = store.persons().delete(reader.id).await.unwrap();
    assert_eq!(deletion.profiles_removed, 1);
    assert_eq!(deletion.likes_removed, 1);

    assert_eq!(store.likes().like_set_size(post.id).await.unwrap(), 0);
    // The post and its author are untouched
    assert_eq!(store.posts().get(post.id).await.unwrap(), post);
    assert_eq!(store.persons().count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_person_without_profile() {
    let store = setup_test_store().await;

    let loner = create_person(&store, "Loner").await;
    let deletion = store.persons().delete(loner.id).await.unwrap();
    assert_eq!(deletion.profiles_removed, 0);
    assert_eq!(deletion.likes_removed, 0);
}

#[tokio::test]
async fn delete_missing_person_is_not_found() {
    let store = setup_test_store().await;

    let err = store.persons().delete(404).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "person",
            id: 404
        }
    ));
}

#[tokio::test]
async fn name_longer_than_thirty_is_rejected() {
    let store = setup_test_store().await;

    let ok = store
        .persons()
        .create(NewPerson::new("x".repeat(30)))
        .await
        .unwrap();
    assert_eq!(ok.name.chars().count(), 30);

    let err = store
        .persons()
        .create(NewPerson::new("x".repeat(31)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::FieldTooLong { ref field, max: 30, actual: 31 } if field == "name"
    ));

    // Rejected input leaves no row behind
    assert_eq!(store.persons().count().await.unwrap(), 1);
}

#[tokio::test]
async fn ids_are_assigned_and_unique() {
    let store = setup_test_store().await;

    let a = create_person(&store, "A").await;
    let b = create_person(&store, "B").await;
    assert_ne!(a.id, b.id);
    assert!(b.id > a.id);

    // Ids are not reused after a delete
    store.persons().delete(b.id).await.unwrap();
    let c = create_person(&store, "C").await;
    assert!(c.id > b.id);
}

#[tokio::test]
async fn update_and_list_persons() {
    let store = setup_test_store().await;

    let bob = create_person(&store, "Bob").await;
    create_person(&store, "Carol").await;
    create_person(&store, "Dave").await;

    let renamed = store
        .persons()
        .update(
            bob.id,
            PersonUpdate {
                name: Some("Robert".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Robert");

    // Empty update keeps the current value
    let same = store
        .persons()
        .update(bob.id, PersonUpdate::default())
        .await
        .unwrap();
    assert_eq!(same.name, "Robert");

    let page = store.persons().list(2, 1).await.unwrap();
    let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Dave"]);

    let err = store
        .persons()
        .update(
            999,
            PersonUpdate {
                name: Some("Ghost".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "person", .. }));

    assert!(matches!(
        store.persons().list(-1, 0).await,
        Err(ServiceError::InvalidInput(_))
    ));
}
