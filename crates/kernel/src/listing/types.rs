//! Listing types.
//!
//! Wire types use camelCase field names so the JSON shape matches what
//! catalog clients already consume (`nextCursor`, `perPage`, ...).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Cuisine, total_price};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page a caller may request.
pub const MAX_LIMIT: u32 = 50;

/// Listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMenusInput {
    /// Only list menus linked to the cuisine with this slug.
    pub cuisine_slug: Option<String>,

    /// Id of the first record of the requested page. `None` is the first page.
    pub cursor: Option<i32>,

    /// Page size, in `1..=MAX_LIMIT`.
    pub limit: u32,
}

impl Default for ListMenusInput {
    fn default() -> Self {
        Self {
            cuisine_slug: None,
            cursor: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Rejected listing request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("cursor must be at least 1, got {0}")]
    Cursor(i32),

    #[error("limit must be between 1 and {MAX_LIMIT}, got {0}")]
    Limit(u32),
}

impl ListMenusInput {
    /// First page with the given filter and page size.
    pub fn first_page(cuisine_slug: Option<&str>, limit: u32) -> Self {
        Self {
            cuisine_slug: cuisine_slug.map(str::to_string),
            cursor: None,
            limit,
        }
    }

    /// The same request, starting at `cursor`.
    pub fn at(mut self, cursor: Option<i32>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Check the cursor and limit bounds.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(cursor) = self.cursor
            && cursor < 1
        {
            return Err(InvalidInput::Cursor(cursor));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(InvalidInput::Limit(self.limit));
        }
        Ok(())
    }
}

/// Position of a validated cursor record in the listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct MenuCursor {
    pub id: i32,
    pub number_of_orders: i32,
}

/// Group as shown on a listing card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupSummary {
    pub id: i32,
    pub name: String,
}

/// Set menu as returned by the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_per_person: f64,
    pub min_spend: f64,
    pub image: String,
    pub thumbnail: String,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub is_halal: bool,
    pub is_kosher: bool,
    pub number_of_orders: i32,

    #[sqlx(skip)]
    pub cuisines: Vec<Cuisine>,

    #[sqlx(skip)]
    pub groups: Vec<GroupSummary>,
}

impl MenuSummary {
    /// Price of this menu for the given number of guests.
    pub fn total_price(&self, guests: u32) -> f64 {
        total_price(self.price_per_person, self.min_spend, guests)
    }
}

/// Aggregated live-menu metrics for one cuisine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CuisineFacet {
    pub id: i32,
    pub name: String,
    pub slug: String,

    /// Live menus linked to this cuisine.
    pub live_menu_count: i64,

    /// Sum of `number_of_orders` over those live menus.
    pub total_orders: i64,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub pages: u64,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(total: u64, per_page: u32) -> Self {
        let pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(per_page))
        };
        Self {
            total,
            pages,
            per_page,
        }
    }
}

/// One page of the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPage {
    pub data: Vec<MenuSummary>,

    /// Id of the first record of the next page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i32>,

    pub pagination: Pagination,

    /// Facets over the whole live catalog, by `total_orders` descending.
    pub cuisines: Vec<CuisineFacet>,
}
