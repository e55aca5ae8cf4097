#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
#![cfg(feature = "sqlite")]
//! Integration tests for `SqliteStore`.

use std::sync::Arc;

use users_core::error::CoreError;
use users_core::traits::Database;
use users_core::types::{Address, Card, User};
use users_store::SqliteStore;

// ===== Helpers =====

async fn create_test_store() -> (SqliteStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = tmp.path().join("data").join("users.db");
    let store = SqliteStore::at_path(&db_path).expect("failed to create SqliteStore");
    store.init().await.expect("failed to initialize SqliteStore");
    (store, tmp)
}

fn make_user(username: &str) -> User {
    User {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        password: "hashed".to_string(),
        salt: "salt".to_string(),
        ..Default::default()
    }
}

fn make_address(street: &str) -> Address {
    Address {
        street: street.to_string(),
        number: "221b".to_string(),
        country: "UK".to_string(),
        city: "London".to_string(),
        postcode: "NW1".to_string(),
        ..Default::default()
    }
}

fn make_card(long_num: &str) -> Card {
    Card {
        long_num: long_num.to_string(),
        expires: "04/29".to_string(),
        ccv: "999".to_string(),
        ..Default::default()
    }
}

// ===== Lifecycle =====

#[tokio::test]
async fn test_operations_fail_before_init() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SqliteStore::at_path(&tmp.path().join("users.db")).unwrap();

    assert_eq!(store.get_users().await.unwrap_err(), CoreError::NotInitialized);
    assert_eq!(store.ping().await.unwrap_err(), CoreError::NotInitialized);
}

#[tokio::test]
async fn test_init_is_idempotent_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("users.db");

    let store = SqliteStore::at_path(&db_path).unwrap();
    store.init().await.unwrap();
    store.init().await.unwrap();
    let mut user = make_user("persisted");
    store.create_user(&mut user).await.unwrap();
    assert!(store.ping().await.is_ok());
    drop(store);

    let reopened = SqliteStore::at_path(&db_path).unwrap();
    reopened.init().await.unwrap();
    let fetched = reopened.get_user(&user.id).await.unwrap();
    assert_eq!(fetched.username, "persisted");
}

#[tokio::test]
async fn test_init_fails_on_bad_url() {
    let store = SqliteStore::new("sqlite:///nonexistent-dir/forbidden/users.db?mode=ro");

    let err = store.init().await.unwrap_err();
    assert!(matches!(err, CoreError::StorageError(_)));
}

// ===== Users =====

#[tokio::test]
async fn test_create_and_get_user() {
    let (store, _tmp) = create_test_store().await;
    let mut user = make_user("alice");
    store.create_user(&mut user).await.unwrap();

    let fetched = store.get_user(&user.id).await.unwrap();
    assert_eq!(fetched.first_name, "Test");
    assert_eq!(fetched.email, "alice@example.com");
    assert_eq!(fetched.password, "hashed");
    assert_eq!(fetched.salt, "salt");

    let by_name = store.get_user_by_name("alice").await.unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(store.get_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (store, _tmp) = create_test_store().await;
    store.create_user(&mut make_user("bob")).await.unwrap();

    let mut dup = make_user("bob");
    dup.addresses.push(make_address("Nowhere"));
    let err = store.create_user(&mut dup).await.unwrap_err();
    assert_eq!(err, CoreError::UsernameTaken("bob".to_string()));
    assert!(store.get_addresses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_and_unknown_ids() {
    let (store, _tmp) = create_test_store().await;

    let err = store.get_user("42").await.unwrap_err();
    assert_eq!(err, CoreError::InvalidId("42".to_string()));

    let id = uuid::Uuid::new_v4().to_string();
    let err = store.get_card(&id).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("cards", id));
}

// ===== Attributes =====

#[tokio::test]
async fn test_attributes_resolve_through_back_reference() {
    let (store, _tmp) = create_test_store().await;
    let mut user = make_user("carol");
    user.cards.push(make_card("4111111111111111"));
    store.create_user(&mut user).await.unwrap();

    let mut address = make_address("Baker Street");
    store.create_address(&mut address, &user.id).await.unwrap();

    let mut fetched = store.get_user(&user.id).await.unwrap();
    assert_eq!(fetched.address_ids(), vec![address.id.clone()]);
    assert_eq!(fetched.card_ids(), user.card_ids());
    assert!(fetched.cards[0].long_num.is_empty());

    store.get_user_attributes(&mut fetched).await.unwrap();
    assert_eq!(fetched.addresses[0].street, "Baker Street");
    assert_eq!(fetched.cards[0].long_num, "4111111111111111");
    assert_eq!(fetched.cards[0].ccv, "999");
}

#[tokio::test]
async fn test_create_attribute_for_missing_owner() {
    let (store, _tmp) = create_test_store().await;
    let missing = uuid::Uuid::new_v4().to_string();

    let mut address = make_address("Elm");
    let err = store
        .create_address(&mut address, &missing)
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::not_found("customers", &missing));
    assert!(address.id.is_empty());
    assert!(store.get_addresses().await.unwrap().is_empty());

    let err = store
        .create_card(&mut make_card("4111111111111111"), &missing)
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::not_found("customers", missing));
    assert!(store.get_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_users_carries_attribute_ids() {
    let (store, _tmp) = create_test_store().await;
    let mut carol = make_user("carol");
    carol.addresses.push(make_address("Baker Street"));
    store.create_user(&mut carol).await.unwrap();
    let mut card = make_card("4111111111111111");
    store.create_card(&mut card, &carol.id).await.unwrap();
    let mut dave = make_user("dave");
    store.create_user(&mut dave).await.unwrap();

    let users = store.get_users().await.unwrap();
    assert_eq!(users.len(), 2);
    let listed = users.iter().find(|u| u.id == carol.id).unwrap();
    assert_eq!(listed.address_ids(), carol.address_ids());
    assert_eq!(listed.card_ids(), vec![card.id.clone()]);
    assert!(listed.cards[0].long_num.is_empty());
    let listed = users.iter().find(|u| u.id == dave.id).unwrap();
    assert!(listed.addresses.is_empty());
    assert!(listed.cards.is_empty());
}

// ===== Delete =====

#[tokio::test]
async fn test_delete_customer_cascades() {
    let (store, _tmp) = create_test_store().await;
    let mut owner = make_user("dave");
    owner.addresses.push(make_address("Elm"));
    store.create_user(&mut owner).await.unwrap();
    store
        .create_card(&mut make_card("4111111111111111"), &owner.id)
        .await
        .unwrap();

    let mut other = make_user("erin");
    store.create_user(&mut other).await.unwrap();
    let mut kept = make_address("Oak");
    store.create_address(&mut kept, &other.id).await.unwrap();

    store.delete("customers", &owner.id).await.unwrap();

    assert!(matches!(
        store.get_user(&owner.id).await.unwrap_err(),
        CoreError::NotFound { .. }
    ));
    assert!(store.get_cards().await.unwrap().is_empty());
    let addresses = store.get_addresses().await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].id, kept.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attribute_create_and_owner_delete() {
    let (store, _tmp) = create_test_store().await;
    let store = Arc::new(store);

    for round in 0..50 {
        let mut user = make_user(&format!("racer{round}"));
        store.create_user(&mut user).await.unwrap();
        let uid = user.id;

        let address_task = {
            let store = Arc::clone(&store);
            let uid = uid.clone();
            tokio::spawn(async move {
                store
                    .create_address(&mut make_address("Race Street"), &uid)
                    .await
            })
        };
        let card_task = {
            let store = Arc::clone(&store);
            let uid = uid.clone();
            tokio::spawn(async move {
                store
                    .create_card(&mut make_card("4111111111111111"), &uid)
                    .await
            })
        };
        let delete_task = {
            let store = Arc::clone(&store);
            let uid = uid.clone();
            tokio::spawn(async move { store.delete("customers", &uid).await })
        };

        for created in [address_task.await.unwrap(), card_task.await.unwrap()] {
            assert!(
                matches!(created, Ok(()) | Err(CoreError::NotFound { .. })),
                "round {round}: {created:?}"
            );
        }
        delete_task.await.unwrap().unwrap();

        let mut owner = User {
            id: uid,
            ..Default::default()
        };
        store.get_user_attributes(&mut owner).await.unwrap();
        assert!(owner.addresses.is_empty(), "round {round}: address outlived owner");
        assert!(owner.cards.is_empty(), "round {round}: card outlived owner");
    }

    assert!(store.get_addresses().await.unwrap().is_empty());
    assert!(store.get_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_card_leaves_owner() {
    let (store, _tmp) = create_test_store().await;
    let mut user = make_user("frank");
    store.create_user(&mut user).await.unwrap();
    let mut card = make_card("5500000000000004");
    store.create_card(&mut card, &user.id).await.unwrap();

    store.delete("cards", &card.id).await.unwrap();

    let owner = store.get_user(&user.id).await.unwrap();
    assert!(owner.cards.is_empty());
    let err = store.delete("cards", &card.id).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("cards", card.id));
}

#[tokio::test]
async fn test_delete_unknown_entity() {
    let (store, _tmp) = create_test_store().await;

    let err = store.delete("orders", "1").await.unwrap_err();
    assert_eq!(err, CoreError::UnknownEntity("orders".to_string()));
}
