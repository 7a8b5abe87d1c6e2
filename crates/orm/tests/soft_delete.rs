//! Soft-delete decorators: exclusion, restore, force delete

mod common;

use common::*;
use filament_orm::{CrudOperations, Model, QueryAction};

#[tokio::test]
async fn test_delete_on_a_soft_deletable_model_stamps_instead_of_removing() {
    let db = setup().await;

    let mut user = User::new("Tanner", Pet::default());
    user.create(&db).await.unwrap();
    let id = user.id.unwrap();

    user.delete(&db).await.unwrap();
    // the row is stamped, not removed
    assert!(user.exists());
    let actions: Vec<QueryAction> = db
        .executed()
        .iter()
        .filter(|q| q.entity == "users")
        .map(|q| q.action)
        .collect();
    assert!(!actions.contains(&QueryAction::Delete));

    // reads exclude the trashed row
    assert!(User::find(&db, id).await.unwrap().is_none());
    assert_eq!(User::query(&db).count().await.unwrap(), 0);

    // unless the builder opts back in
    let trashed = User::query(&db).with_deleted().all().await.unwrap();
    assert_eq!(trashed.len(), 1);
    assert!(trashed[0].deleted_at.is_some());
}

#[tokio::test]
async fn test_restore_clears_the_stamp() {
    let db = setup().await;

    let mut user = User::new("Logan", Pet::default());
    user.create(&db).await.unwrap();
    let id = user.id.unwrap();

    user.delete(&db).await.unwrap();
    assert!(User::find(&db, id).await.unwrap().is_none());

    user.restore(&db).await.unwrap();
    let restored = User::find(&db, id).await.unwrap().unwrap();
    assert_eq!(restored.name, "Logan");
    assert!(restored.deleted_at.is_none());
}

#[tokio::test]
async fn test_force_delete_removes_the_row() {
    let db = setup().await;

    let mut user = User::new("Tanner", Pet::default());
    user.create(&db).await.unwrap();

    user.force_delete(&db).await.unwrap();
    assert!(!user.exists());

    let remaining = User::query(&db).with_deleted().all().await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
#[should_panic(expected = "has no soft-delete field")]
async fn test_restore_on_a_hard_delete_model_panics() {
    let db = setup().await;
    let mut galaxy = Galaxy::new("Milky Way");
    galaxy.create(&db).await.unwrap();
    let _ = galaxy.restore(&db).await;
}
