//! Set menu listing.
//!
//! This module provides:
//! - MenuFilter: the predicate shared by the page, count and cursor queries
//! - MenuQueryBuilder: SeaQuery-based SQL generation for that predicate
//! - MenuStore: the read seam, with PostgreSQL and in-memory implementations
//! - MenuListingService: cursor pagination plus cuisine facets
//! - Types: ListMenusInput, MenuPage, Pagination, CuisineFacet, etc.

mod filter;
mod memory_store;
mod pg_store;
mod query_builder;
mod service;
mod store;
pub mod types;

pub use filter::{MenuFilter, build_filter};
pub use memory_store::MemoryMenuStore;
pub use pg_store::PgMenuStore;
pub use query_builder::MenuQueryBuilder;
pub use service::MenuListingService;
pub use store::MenuStore;
pub use types::{
    CuisineFacet, DEFAULT_LIMIT, GroupSummary, InvalidInput, ListMenusInput, MAX_LIMIT,
    MenuCursor, MenuPage, MenuSummary, Pagination,
};
