//! Set menu listing API.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::listing::{CuisineFacet, ListMenusInput, MenuSummary, Pagination};
use crate::state::AppState;

/// Create the listing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/menus", get(list_menus))
}

// -------------------------------------------------------------------------
// Request / response types
// -------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListParams {
    cuisine_slug: Option<String>,
    /// Wider than a menu id so oversized cursors fall back instead of failing.
    cursor: Option<u64>,
    limit: Option<u32>,
    /// Guest count used to price each menu.
    guests: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PricedMenu {
    #[serde(flatten)]
    menu: MenuSummary,

    #[serde(skip_serializing_if = "Option::is_none")]
    total_price: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    data: Vec<PricedMenu>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_cursor: Option<i32>,
    pagination: Pagination,
    cuisines: Vec<CuisineFacet>,
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_menus(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse>> {
    if params.guests == Some(0) {
        return Err(AppError::BadRequest(
            "guests must be at least 1".to_string(),
        ));
    }

    let cursor = params.cursor.and_then(|raw| match i32::try_from(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            debug!(cursor = raw, "discarding out-of-range cursor");
            None
        }
    });

    let input = ListMenusInput::first_page(
        params.cuisine_slug.as_deref(),
        params.limit.unwrap_or(state.listing_default_limit()),
    )
    .at(cursor);
    input.validate()?;

    let started = Instant::now();
    let page = state
        .listing()
        .list_menus(&input)
        .await
        .map_err(AppError::from_service)?;

    let filtered = input
        .cuisine_slug
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    state
        .metrics()
        .record_listing(filtered, page.data.len(), started.elapsed().as_secs_f64());

    let data = page
        .data
        .into_iter()
        .map(|menu| PricedMenu {
            total_price: params.guests.map(|g| menu.total_price(g)),
            menu,
        })
        .collect();

    Ok(Json(ListResponse {
        data,
        next_cursor: page.next_cursor,
        pagination: page.pagination,
        cuisines: page.cuisines,
    }))
}
