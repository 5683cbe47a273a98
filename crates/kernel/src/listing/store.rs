//! Store seam for the listing.

use anyhow::Result;
use async_trait::async_trait;

use super::filter::MenuFilter;
use super::types::{CuisineFacet, MenuCursor, MenuSummary};
use crate::models::MenuDetail;

/// Read access to the set menu catalog.
///
/// Every filtered method must evaluate `filter` identically; the listing
/// relies on page, count and cursor lookup seeing the same records.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Return the ordering key of menu `id` if it exists and passes `filter`.
    async fn find_cursor(&self, id: i32, filter: &MenuFilter) -> Result<Option<MenuCursor>>;

    /// Up to `take` menus passing `filter`, ordered by `number_of_orders`
    /// descending then `id` ascending, starting at `start` (inclusive).
    async fn find_page(
        &self,
        filter: &MenuFilter,
        start: Option<&MenuCursor>,
        take: u64,
    ) -> Result<Vec<MenuSummary>>;

    /// Number of menus passing `filter`.
    async fn count(&self, filter: &MenuFilter) -> Result<u64>;

    /// Live menu count and total orders for every cuisine with at least one
    /// live menu, ignoring any cuisine filter.
    async fn cuisine_facets(&self) -> Result<Vec<CuisineFacet>>;

    /// Every menu regardless of status, with cuisines and groups.
    async fn dump(&self) -> Result<Vec<MenuDetail>>;

    /// Whether the store is reachable.
    async fn ping(&self) -> bool;
}
