//! Menu listing service.
//!
//! Provides the catalog's one listing shape:
//! - live menus, optionally restricted to one cuisine
//! - ordered by popularity, paginated by an inclusive cursor
//! - global cuisine facets for the filter UI

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use super::filter::build_filter;
use super::store::MenuStore;
use super::types::{ListMenusInput, MenuPage, Pagination};

/// Service for listing set menus.
pub struct MenuListingService {
    store: Arc<dyn MenuStore>,
}

impl MenuListingService {
    /// Create a new MenuListingService.
    pub fn new(store: Arc<dyn MenuStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    /// List one page of menus.
    ///
    /// A cursor that does not exist or no longer passes the filter is
    /// dropped and the first page is returned instead. `next_cursor` is the
    /// id of the first record of the following page.
    pub async fn list_menus(&self, input: &ListMenusInput) -> Result<MenuPage> {
        input.validate()?;

        let filter = build_filter(input.cuisine_slug.as_deref());
        let limit = input.limit;

        let start = match input.cursor {
            Some(id) => {
                let found = self.store.find_cursor(id, &filter).await?;
                if found.is_none() {
                    debug!(cursor = id, ?filter, "discarding stale cursor");
                }
                found
            }
            None => None,
        };

        let take = u64::from(limit) + 1;
        let (mut data, total, mut cuisines) = tokio::try_join!(
            self.store.find_page(&filter, start.as_ref(), take),
            self.store.count(&filter),
            self.store.cuisine_facets(),
        )?;

        let limit_len = limit as usize;
        let next_cursor = if data.len() > limit_len {
            data.truncate(limit_len + 1);
            data.pop().map(|m| m.id)
        } else {
            None
        };

        // Stable, so equal totals keep the store's order.
        cuisines.sort_by(|a, b| b.total_orders.cmp(&a.total_orders));

        debug!(
            returned = data.len(),
            total,
            next_cursor = ?next_cursor,
            "listed menus"
        );

        Ok(MenuPage {
            data,
            next_cursor,
            pagination: Pagination::new(total, limit),
            cuisines,
        })
    }
}
