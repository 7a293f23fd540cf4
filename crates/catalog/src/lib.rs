//! Catalog orchestration: record mutations and thumbnail lifecycle in
//! lockstep.
//!
//! [`CatalogManager`] coordinates the record store (`manuals-db`) and the
//! asset store (`manuals-assets`) so that a successfully written record
//! never references a missing asset, and a failed write never strands an
//! asset that no record references:
//!
//! - create stores the thumbnail before the insert, and removes it again
//!   if the insert loses an order-uniqueness race;
//! - update stores the replacement thumbnail before the row update, and
//!   removes the *prior* asset only after the update commits;
//! - delete removes the row first, then its asset.
//!
//! Post-commit asset removal is best-effort: its result is carried as an
//! [`AssetCleanup`] advisory next to the primary outcome and never turns a
//! committed mutation into an error.

use manuals_assets::AssetStore;
use manuals_core::error::CoreError;
use manuals_core::manual::ManualInput;
use manuals_core::types::DbId;
use manuals_db::models::manual::{Manual, ManualChanges, NewManual};
use manuals_db::repositories::ManualRepo;
use manuals_db::DbPool;

/// An uploaded thumbnail: original filename plus content.
///
/// The filename only contributes its extension to the stored key; the key
/// itself is assigned by the asset store.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Advisory outcome of a best-effort asset cleanup.
///
/// Callers may inspect this for diagnostics; it never changes the primary
/// outcome of the mutation that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetCleanup {
    /// No asset was attached, or no replacement happened.
    NotNeeded,
    /// The asset was removed.
    Removed,
    /// The asset was already gone.
    Missing,
    /// Removal failed; the orphaned file stays behind on disk.
    Failed(String),
}

/// A committed mutation paired with its cleanup advisory.
#[derive(Debug)]
pub struct MutationOutcome {
    pub manual: Manual,
    pub cleanup: AssetCleanup,
}

/// Orchestrates the record store and the asset store.
///
/// Constructed once at startup with the shared pool and asset root; there
/// is no ambient global state.
#[derive(Clone)]
pub struct CatalogManager {
    pool: DbPool,
    assets: AssetStore,
}

impl CatalogManager {
    pub fn new(pool: DbPool, assets: AssetStore) -> Self {
        Self { pool, assets }
    }

    /// Create a record, optionally with a thumbnail.
    ///
    /// The asset is stored before the insert so a readable record always
    /// references an existing file. If the insert then fails (typically an
    /// order conflict), the just-stored asset is orphaned and is deleted
    /// before the error propagates.
    pub async fn create(
        &self,
        input: ManualInput,
        upload: Option<Upload>,
    ) -> Result<Manual, CoreError> {
        let thumbnail_key = match &upload {
            Some(u) => Some(self.assets.store(&u.bytes, &u.filename).await?),
            None => None,
        };

        let new = NewManual {
            video_link: input.video_link,
            title: input.title,
            description: input.description,
            display_order: input.order,
            thumbnail_key: thumbnail_key.clone(),
        };

        match ManualRepo::insert(&self.pool, &new).await {
            Ok(manual) => {
                tracing::info!(
                    manual_id = manual.id,
                    display_order = manual.display_order,
                    has_thumbnail = manual.thumbnail_key.is_some(),
                    "Manual created",
                );
                Ok(manual)
            }
            Err(err) => {
                // The stored thumbnail now belongs to no record.
                if let Some(key) = &thumbnail_key {
                    self.discard(key).await;
                }
                Err(classify_write_error(err, new.display_order))
            }
        }
    }

    /// Fetch one record by id.
    pub async fn get(&self, id: DbId) -> Result<Manual, CoreError> {
        ManualRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound {
                entity: "Manual",
                id,
            })
    }

    /// List every record in insertion order.
    ///
    /// Callers needing display order sort by the `order` field themselves.
    pub async fn list(&self) -> Result<Vec<Manual>, CoreError> {
        ManualRepo::list_all(&self.pool).await.map_err(storage_error)
    }

    /// Update a record, optionally replacing its thumbnail.
    ///
    /// The replacement asset is stored and referenced within the same call,
    /// and the prior asset is removed only after the row update commits.
    /// If the update fails after the replacement was stored, the
    /// replacement is deleted again -- no record ever referenced it.
    pub async fn update(
        &self,
        id: DbId,
        input: ManualInput,
        upload: Option<Upload>,
    ) -> Result<MutationOutcome, CoreError> {
        // Refuse early if a different record already holds the target
        // order. The unique constraint still backstops a race.
        if let Some(holder) = ManualRepo::find_by_order(&self.pool, input.order)
            .await
            .map_err(storage_error)?
        {
            if holder.id != id {
                return Err(order_conflict(input.order));
            }
        }

        let current = ManualRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound {
                entity: "Manual",
                id,
            })?;

        let new_key = match &upload {
            Some(u) => Some(self.assets.store(&u.bytes, &u.filename).await?),
            None => None,
        };

        let changes = ManualChanges {
            video_link: input.video_link,
            title: input.title,
            description: input.description,
            display_order: input.order,
            thumbnail_key: new_key.clone(),
        };

        match ManualRepo::update(&self.pool, id, &changes).await {
            Ok(Some(manual)) => {
                // A committed replacement leaves the prior asset
                // unreferenced.
                let cleanup = match (&new_key, current.thumbnail_key.as_deref()) {
                    (Some(_), Some(old_key)) => self.discard(old_key).await,
                    _ => AssetCleanup::NotNeeded,
                };
                tracing::info!(
                    manual_id = manual.id,
                    display_order = manual.display_order,
                    thumbnail_replaced = new_key.is_some(),
                    "Manual updated",
                );
                Ok(MutationOutcome { manual, cleanup })
            }
            Ok(None) => {
                // Row vanished between lookup and update.
                if let Some(key) = &new_key {
                    self.discard(key).await;
                }
                Err(CoreError::NotFound {
                    entity: "Manual",
                    id,
                })
            }
            Err(err) => {
                if let Some(key) = &new_key {
                    self.discard(key).await;
                }
                Err(classify_write_error(err, changes.display_order))
            }
        }
    }

    /// Delete a record, then best-effort delete its thumbnail.
    ///
    /// Asset removal never blocks the record deletion from succeeding.
    pub async fn delete(&self, id: DbId) -> Result<MutationOutcome, CoreError> {
        let removed = ManualRepo::delete(&self.pool, id)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound {
                entity: "Manual",
                id,
            })?;

        let cleanup = match removed.thumbnail_key.as_deref() {
            Some(key) => self.discard(key).await,
            None => AssetCleanup::NotNeeded,
        };

        tracing::info!(manual_id = id, "Manual deleted");
        Ok(MutationOutcome {
            manual: removed,
            cleanup,
        })
    }

    /// Best-effort asset removal. Failures are logged and reported as an
    /// advisory outcome, never as an error.
    async fn discard(&self, key: &str) -> AssetCleanup {
        match self.assets.delete(key).await {
            Ok(true) => AssetCleanup::Removed,
            Ok(false) => AssetCleanup::Missing,
            Err(err) => {
                tracing::warn!(
                    asset_key = %key,
                    error = %err,
                    "Thumbnail cleanup failed; file left behind",
                );
                AssetCleanup::Failed(err.to_string())
            }
        }
    }
}

fn order_conflict(order: i64) -> CoreError {
    CoreError::Conflict(format!("a manual with order {order} already exists"))
}

fn storage_error(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

/// Classify a write error from the record store: a unique violation is an
/// order conflict, anything else a storage failure.
fn classify_write_error(err: sqlx::Error, order: i64) -> CoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => order_conflict(order),
        _ => storage_error(err),
    }
}
