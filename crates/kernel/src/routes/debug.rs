//! Debug dump of the whole catalog.
//!
//! Served only when `DEBUG_ENDPOINTS` is enabled; answers 404 otherwise.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::{AppError, AppResult};
use crate::models::MenuDetail;
use crate::state::AppState;

/// Create the debug router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/debug/menus", get(dump_menus))
}

/// Every set menu in any status, with cuisines and groups.
async fn dump_menus(State(state): State<AppState>) -> AppResult<Json<Vec<MenuDetail>>> {
    if !state.debug_endpoints_enabled() {
        return Err(AppError::NotFound);
    }

    let menus = state.store().dump().await?;
    Ok(Json(menus))
}
