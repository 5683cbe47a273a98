//! Write seam used by the harvester.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Cuisine, NewSetMenu};

/// Write access to the catalog.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Insert the cuisine or update its name and slug.
    async fn upsert_cuisine(&self, cuisine: &Cuisine) -> Result<()>;

    /// Create a set menu with its cuisine links and groups, atomically.
    /// Returns the new menu id.
    async fn create_set_menu(&self, menu: &NewSetMenu) -> Result<i32>;
}
