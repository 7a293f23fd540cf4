//! Manual record entity and write payloads.

use manuals_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `manuals` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Manual {
    pub id: DbId,
    pub video_link: String,
    pub title: String,
    pub description: String,
    pub display_order: i64,
    /// Opaque asset-store key of the thumbnail, `None` when the record has
    /// no thumbnail.
    pub thumbnail_key: Option<String>,
}

/// Insert payload; `id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewManual {
    pub video_link: String,
    pub title: String,
    pub description: String,
    pub display_order: i64,
    pub thumbnail_key: Option<String>,
}

/// Update payload.
///
/// `thumbnail_key` is applied only when `Some`, so an update without a new
/// upload leaves the record's existing asset reference untouched.
#[derive(Debug, Clone)]
pub struct ManualChanges {
    pub video_link: String,
    pub title: String,
    pub description: String,
    pub display_order: i64,
    pub thumbnail_key: Option<String>,
}
