use std::sync::Arc;

use manuals_catalog::CatalogManager;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Built once at startup; no ambient singletons. Cheaply cloneable (inner
/// data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks; the catalog holds its own
    /// handle).
    pub pool: manuals_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Catalog orchestrator coordinating records and thumbnails.
    pub catalog: Arc<CatalogManager>,
}
