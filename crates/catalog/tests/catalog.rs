//! Integration tests for the catalog manager.
//!
//! Exercises the record/asset lifecycle contract against a real database
//! and a real filesystem asset root:
//! - create/get round trip and the duplicate-order scenario
//! - no residual asset after a create that loses the order slot
//! - thumbnail replacement on update removes the prior asset
//! - delete removes the row first, asset second, and asset deletion stays
//!   idempotent
//! - order uniqueness under concurrent creates

use assert_matches::assert_matches;
use manuals_assets::AssetStore;
use manuals_catalog::{AssetCleanup, CatalogManager, Upload};
use manuals_core::error::CoreError;
use manuals_core::manual::ManualInput;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn manager(pool: SqlitePool) -> (tempfile::TempDir, CatalogManager) {
    let dir = tempfile::tempdir().unwrap();
    let assets = AssetStore::new(dir.path());
    (dir, CatalogManager::new(pool, assets))
}

fn input(order: i64, title: &str) -> ManualInput {
    ManualInput {
        video_link: "https://example.com/v1".to_string(),
        title: title.to_string(),
        description: "D1".to_string(),
        order,
    }
}

fn upload(name: &str, bytes: &[u8]) -> Option<Upload> {
    Some(Upload {
        filename: name.to_string(),
        bytes: bytes.to_vec(),
    })
}

/// Number of files currently in the asset root.
fn asset_count(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

// ---------------------------------------------------------------------------
// Round trip and the ordered-catalog scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_then_get_round_trips(pool: SqlitePool) {
    let (_dir, catalog) = manager(pool);

    let created = catalog.create(input(1, "T1"), None).await.unwrap();
    let fetched = catalog.get(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.title, "T1");
    assert_eq!(fetched.display_order, 1);
    assert!(fetched.thumbnail_key.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_order_scenario(pool: SqlitePool) {
    let (_dir, catalog) = manager(pool);

    // Create order 1.
    let first = catalog.create(input(1, "T1"), None).await.unwrap();

    // Second create with order 1 conflicts; record count unchanged.
    let err = catalog.create(input(1, "T2"), None).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(catalog.list().await.unwrap().len(), 1);

    // Move the first record to order 2.
    let moved = catalog.update(first.id, input(2, "T1"), None).await.unwrap();
    assert_eq!(moved.manual.display_order, 2);

    // Order 1 is free again.
    catalog.create(input(1, "T3"), None).await.unwrap();

    // Delete the first record; it is gone afterwards.
    catalog.delete(first.id).await.unwrap();
    let err = catalog.get(first.id).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { id, .. } if id == first.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_unknown_id_is_not_found(pool: SqlitePool) {
    let (_dir, catalog) = manager(pool);
    assert_matches!(
        catalog.get(424242).await.unwrap_err(),
        CoreError::NotFound { entity: "Manual", .. }
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_returns_insertion_order(pool: SqlitePool) {
    let (_dir, catalog) = manager(pool);

    catalog.create(input(9, "first"), None).await.unwrap();
    catalog.create(input(3, "second"), None).await.unwrap();

    let titles: Vec<_> = catalog
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

// ---------------------------------------------------------------------------
// Asset lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_thumbnail_stores_exactly_one_asset(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    let created = catalog
        .create(input(1, "T1"), upload("cover.png", b"png"))
        .await
        .unwrap();

    assert!(created.thumbnail_key.is_some());
    assert_eq!(asset_count(&dir), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn conflicting_create_leaves_no_orphan_asset(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    catalog.create(input(1, "holder"), None).await.unwrap();

    let err = catalog
        .create(input(1, "loser"), upload("cover.png", b"png"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    // The stored thumbnail was removed before the error propagated.
    assert_eq!(asset_count(&dir), 0);
    assert_eq!(catalog.list().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_replaces_thumbnail_and_removes_prior(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    let created = catalog
        .create(input(1, "T1"), upload("old.png", b"old"))
        .await
        .unwrap();
    let old_key = created.thumbnail_key.clone().unwrap();

    let outcome = catalog
        .update(created.id, input(1, "T1"), upload("new.png", b"new"))
        .await
        .unwrap();

    let new_key = outcome.manual.thumbnail_key.clone().unwrap();
    assert_ne!(new_key, old_key);
    assert_eq!(outcome.cleanup, AssetCleanup::Removed);

    // Exactly one asset remains, and it is the one the record references.
    assert_eq!(asset_count(&dir), 1);
    let remaining = std::fs::read_dir(dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .file_name();
    assert_eq!(remaining.to_str().unwrap(), new_key);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_without_upload_keeps_existing_asset(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    let created = catalog
        .create(input(1, "T1"), upload("keep.png", b"keep"))
        .await
        .unwrap();
    let key = created.thumbnail_key.clone().unwrap();

    let outcome = catalog
        .update(created.id, input(2, "T1 renamed"), None)
        .await
        .unwrap();

    assert_eq!(outcome.manual.thumbnail_key.as_deref(), Some(key.as_str()));
    assert_eq!(outcome.cleanup, AssetCleanup::NotNeeded);
    assert_eq!(asset_count(&dir), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn conflicting_update_leaves_no_new_asset(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    catalog.create(input(1, "holder"), None).await.unwrap();
    let target = catalog
        .create(input(2, "target"), upload("cur.png", b"cur"))
        .await
        .unwrap();

    // Moving target onto order 1 conflicts before anything is stored.
    let err = catalog
        .update(target.id, input(1, "target"), upload("new.png", b"new"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    // Only the original thumbnail remains, still referenced.
    assert_eq!(asset_count(&dir), 1);
    let unchanged = catalog.get(target.id).await.unwrap();
    assert_eq!(unchanged.thumbnail_key, target.thumbnail_key);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_unknown_id_leaves_no_new_asset(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    let err = catalog
        .update(9999, input(1, "ghost"), upload("new.png", b"new"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
    assert_eq!(asset_count(&dir), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_removes_record_and_asset_idempotently(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    let created = catalog
        .create(input(1, "T1"), upload("cover.png", b"png"))
        .await
        .unwrap();
    let key = created.thumbnail_key.clone().unwrap();

    let outcome = catalog.delete(created.id).await.unwrap();
    assert_eq!(outcome.manual.id, created.id);
    assert_eq!(outcome.cleanup, AssetCleanup::Removed);
    assert_eq!(asset_count(&dir), 0);

    // Re-invoking asset deletion for the same reference reports "not
    // found" rather than erroring.
    let assets = AssetStore::new(dir.path());
    assert!(!assets.delete(&key).await.unwrap());

    // Deleting the record again is NotFound.
    assert_matches!(
        catalog.delete(created.id).await.unwrap_err(),
        CoreError::NotFound { .. }
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_reports_missing_asset_as_advisory(pool: SqlitePool) {
    let (dir, catalog) = manager(pool);

    let created = catalog
        .create(input(1, "T1"), upload("cover.png", b"png"))
        .await
        .unwrap();

    // Asset disappears out-of-band; the delete still succeeds.
    let key = created.thumbnail_key.clone().unwrap();
    std::fs::remove_file(dir.path().join(&key)).unwrap();

    let outcome = catalog.delete(created.id).await.unwrap();
    assert_eq!(outcome.cleanup, AssetCleanup::Missing);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_creates_with_same_order_admit_exactly_one(pool: SqlitePool) {
    let (_dir, catalog) = manager(pool);

    let (a, b) = tokio::join!(
        catalog.create(input(44, "racer-a"), None),
        catalog.create(input(44, "racer-b"), None),
    );

    // The store-level constraint admits exactly one writer.
    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one concurrent create must win"
    );
    assert_eq!(catalog.list().await.unwrap().len(), 1);
}
