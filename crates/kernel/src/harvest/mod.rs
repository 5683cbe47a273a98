//! Catalog harvesting.
//!
//! Pulls the upstream set menu document, validates all of it, then writes
//! cuisines and set menus record by record through a [`CatalogWriter`].

mod payload;
mod service;
mod writer;

pub use payload::{ApiCuisine, ApiGroups, ApiResponse, ApiSetMenu, GroupFlags, HarvestRecord, parse_payload};
pub use service::{DEFAULT_SOURCE_URL, HarvestConfig, HarvestError, HarvestReport, Harvester};
pub use writer::CatalogWriter;
