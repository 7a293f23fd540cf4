//! Repository for the `manuals` table.

use manuals_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::manual::{Manual, ManualChanges, NewManual};

const COLUMNS: &str = "id, video_link, title, description, display_order, thumbnail_key";

/// CRUD operations for manual records.
///
/// Order-uniqueness is enforced by the `uq_manuals_display_order`
/// constraint; `insert` and `update` surface a collision as a sqlx
/// unique-violation database error rather than pre-checking, so two
/// concurrent writers can never both succeed.
pub struct ManualRepo;

impl ManualRepo {
    /// Insert a new manual, returning the created row with its assigned id.
    pub async fn insert(pool: &SqlitePool, input: &NewManual) -> Result<Manual, sqlx::Error> {
        let query = format!(
            "INSERT INTO manuals \
                (video_link, title, description, display_order, thumbnail_key) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Manual>(&query)
            .bind(&input.video_link)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.display_order)
            .bind(&input.thumbnail_key)
            .fetch_one(pool)
            .await
    }

    /// Find a manual by id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Manual>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM manuals WHERE id = $1");
        sqlx::query_as::<_, Manual>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the manual currently holding a display order, if any.
    pub async fn find_by_order(
        pool: &SqlitePool,
        display_order: i64,
    ) -> Result<Option<Manual>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM manuals WHERE display_order = $1");
        sqlx::query_as::<_, Manual>(&query)
            .bind(display_order)
            .fetch_optional(pool)
            .await
    }

    /// Apply changes to a manual, returning the updated row.
    ///
    /// Returns `None` if the id does not exist. A `None` thumbnail in the
    /// payload keeps the stored key.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        changes: &ManualChanges,
    ) -> Result<Option<Manual>, sqlx::Error> {
        let query = format!(
            "UPDATE manuals SET \
                video_link = $2, \
                title = $3, \
                description = $4, \
                display_order = $5, \
                thumbnail_key = COALESCE($6, thumbnail_key) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Manual>(&query)
            .bind(id)
            .bind(&changes.video_link)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.display_order)
            .bind(&changes.thumbnail_key)
            .fetch_optional(pool)
            .await
    }

    /// Delete a manual, returning the removed row so the caller can clean
    /// up its asset. Returns `None` if already absent.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<Option<Manual>, sqlx::Error> {
        let query = format!("DELETE FROM manuals WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Manual>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every manual, in insertion order (ids are monotonic).
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Manual>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM manuals ORDER BY id ASC");
        sqlx::query_as::<_, Manual>(&query).fetch_all(pool).await
    }

    /// Total number of records.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM manuals")
            .fetch_one(pool)
            .await
    }
}
