//! Integration tests for the note store's listing, search, and update
//! behavior.
//!
//! This test suite validates:
//! - Pin-first ordering with insertion order inside each partition
//! - Owner scoping of category listings and search
//! - Search matching on the owning category's title
//! - Detaching a note from its category via explicit null
//!
//! **IMPORTANT**: These tests require a PostgreSQL database. The connection
//! URL comes from `DATABASE_URL`; migrations run automatically on setup.

use notevault_core::{Error, UpdateNoteRequest};
use notevault_db::test_fixtures::{note_request, register_request, setup_test_db};
use uuid::Uuid;

#[tokio::test]
async fn test_pinned_notes_list_first_in_insertion_order() {
    let db = setup_test_db().await;

    let user = db
        .users
        .register(register_request("pin-order"))
        .await
        .expect("Failed to register user");
    let category = db
        .categories
        .create(user.id, "Ordering")
        .await
        .expect("Failed to create category");

    let mut ids = Vec::new();
    for title in ["alpha", "bravo", "charlie"] {
        let note = db
            .notes
            .create(user.id, note_request(title, category.id))
            .await
            .expect("Failed to create note");
        ids.push(note.id);
    }

    // Pin the middle note; it must jump ahead of both neighbors.
    let pinned = db
        .notes
        .toggle_pin(user.id, ids[1])
        .await
        .expect("Failed to toggle pin");
    assert!(pinned);

    let listed = db.notes.list(user.id).await.expect("Failed to list notes");
    let titles: Vec<&str> = listed.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["bravo", "alpha", "charlie"]);

    // Same ordering inside a single category.
    let listed = db
        .notes
        .list_by_category(user.id, category.id)
        .await
        .expect("Failed to list by category");
    let titles: Vec<&str> = listed.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["bravo", "alpha", "charlie"]);
}

#[tokio::test]
async fn test_category_listing_is_owner_scoped() {
    let db = setup_test_db().await;

    let owner = db
        .users
        .register(register_request("scope-owner"))
        .await
        .expect("Failed to register owner");
    let intruder = db
        .users
        .register(register_request("scope-intruder"))
        .await
        .expect("Failed to register intruder");

    let category = db
        .categories
        .create(owner.id, "Mine")
        .await
        .expect("Failed to create category");
    db.notes
        .create(owner.id, note_request("mine", category.id))
        .await
        .expect("Failed to create note");

    // A foreign category reads as missing even though it has notes.
    match db.notes.list_by_category(intruder.id, category.id).await {
        Err(Error::NotFound(msg)) => assert_eq!(msg, "Category not found"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_is_owner_scoped_and_matches_category_title() {
    let db = setup_test_db().await;

    let user_a = db
        .users
        .register(register_request("search-a"))
        .await
        .expect("Failed to register user");
    let user_b = db
        .users
        .register(register_request("search-b"))
        .await
        .expect("Failed to register user");

    // A marker unique to this run keeps earlier rows out of the results.
    let marker = Uuid::now_v7().simple().to_string();

    let cat_a = db
        .categories
        .create(user_a.id, &format!("recipes-{}", marker))
        .await
        .expect("Failed to create category");
    let cat_b = db
        .categories
        .create(user_b.id, "plain")
        .await
        .expect("Failed to create category");

    // Matches via its category title, not its own.
    let by_category = db
        .notes
        .create(user_a.id, note_request("weeknight dinner", cat_a.id))
        .await
        .expect("Failed to create note");
    // The other user's note matches by title but must stay invisible.
    db.notes
        .create(user_b.id, note_request(&format!("note-{}", marker), cat_b.id))
        .await
        .expect("Failed to create note");

    let found = db
        .notes
        .search(user_a.id, &marker)
        .await
        .expect("Failed to search");
    let ids: Vec<Uuid> = found.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![by_category.id]);
}

#[tokio::test]
async fn test_update_with_null_category_detaches_note() {
    let db = setup_test_db().await;

    let user = db
        .users
        .register(register_request("detach"))
        .await
        .expect("Failed to register user");
    let category = db
        .categories
        .create(user.id, "Temporary")
        .await
        .expect("Failed to create category");
    let note = db
        .notes
        .create(user.id, note_request("floating", category.id))
        .await
        .expect("Failed to create note");
    assert_eq!(note.category_id, Some(category.id));

    let detach = UpdateNoteRequest {
        category: Some(None),
        ..Default::default()
    };
    let updated = db
        .notes
        .update(user.id, note.id, detach)
        .await
        .expect("Failed to update note");
    assert_eq!(updated.category_id, None);
    assert_eq!(updated.title, "floating");

    // An update that omits the field leaves the detached state alone.
    let retitle = UpdateNoteRequest {
        title: Some("anchored".to_string()),
        ..Default::default()
    };
    let updated = db
        .notes
        .update(user.id, note.id, retitle)
        .await
        .expect("Failed to update note");
    assert_eq!(updated.category_id, None);
    assert_eq!(updated.title, "anchored");
}
