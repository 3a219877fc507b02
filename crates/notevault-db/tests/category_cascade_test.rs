//! Integration tests for category cascade deletion.
//!
//! This test suite validates:
//! - Deleting a category removes exactly its own notes, atomically
//! - Notes in other categories survive the cascade
//! - Foreign categories cannot be deleted and report as missing
//!
//! **IMPORTANT**: These tests require a PostgreSQL database. The connection
//! URL comes from `DATABASE_URL`; migrations run automatically on setup.

use notevault_core::Error;
use notevault_db::test_fixtures::{note_request, register_request, setup_test_db};

#[tokio::test]
async fn test_cascade_delete_removes_exactly_the_categorys_notes() {
    let db = setup_test_db().await;

    let user = db
        .users
        .register(register_request("cascade"))
        .await
        .expect("Failed to register user");

    let doomed = db
        .categories
        .create(user.id, "Doomed")
        .await
        .expect("Failed to create category");
    let survivor = db
        .categories
        .create(user.id, "Survivor")
        .await
        .expect("Failed to create category");

    for title in ["one", "two", "three"] {
        db.notes
            .create(user.id, note_request(title, doomed.id))
            .await
            .expect("Failed to create note");
    }
    let kept = db
        .notes
        .create(user.id, note_request("kept", survivor.id))
        .await
        .expect("Failed to create note");

    let removed = db
        .categories
        .delete(user.id, doomed.id)
        .await
        .expect("Failed to delete category");
    assert_eq!(removed, 3, "Cascade must remove exactly the filed notes");

    // Both the category and its notes are gone.
    assert!(matches!(
        db.notes.list_by_category(user.id, doomed.id).await,
        Err(Error::NotFound(_))
    ));
    let remaining = db.notes.list(user.id).await.expect("Failed to list notes");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
}

#[tokio::test]
async fn test_foreign_category_delete_is_not_found() {
    let db = setup_test_db().await;

    let owner = db
        .users
        .register(register_request("casc-owner"))
        .await
        .expect("Failed to register owner");
    let intruder = db
        .users
        .register(register_request("casc-intruder"))
        .await
        .expect("Failed to register intruder");

    let category = db
        .categories
        .create(owner.id, "Private")
        .await
        .expect("Failed to create category");
    let note = db
        .notes
        .create(owner.id, note_request("private note", category.id))
        .await
        .expect("Failed to create note");

    match db.categories.delete(intruder.id, category.id).await {
        Err(Error::NotFound(msg)) => assert_eq!(msg, "Category not found"),
        other => panic!("Expected NotFound, got {:?}", other),
    }

    // Nothing was deleted on the failed attempt.
    db.notes
        .get(owner.id, note.id)
        .await
        .expect("Owner's note must survive a foreign delete attempt");
}
