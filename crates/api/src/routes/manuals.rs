//! Route definitions for the manual catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::manuals;
use crate::state::AppState;

/// Routes mounted at `/oe_manuals`.
///
/// ```text
/// GET    /        -> list_manuals
/// POST   /        -> create_manual
/// GET    /{id}    -> get_manual
/// PUT    /{id}    -> update_manual
/// DELETE /{id}    -> delete_manual
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(manuals::list_manuals).post(manuals::create_manual),
        )
        .route(
            "/{id}",
            get(manuals::get_manual)
                .put(manuals::update_manual)
                .delete(manuals::delete_manual),
        )
}
