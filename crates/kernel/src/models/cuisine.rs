//! Cuisine model.
//!
//! Cuisines are owned by the harvester: rows are upserted by their upstream id
//! and linked to set menus through the `set_menu_cuisine` join table.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A cuisine a set menu can be filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cuisine {
    /// Upstream identifier.
    pub id: i32,

    /// Display name.
    pub name: String,

    /// URL-safe identifier used by the listing filter.
    pub slug: String,
}

impl Cuisine {
    /// Build a cuisine whose slug is derived from its name.
    pub fn from_name(id: i32, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { id, name, slug }
    }

    /// Find a cuisine by ID.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let cuisine =
            sqlx::query_as::<_, Self>("SELECT id, name, slug FROM cuisine WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("failed to fetch cuisine")?;

        Ok(cuisine)
    }

    /// Insert the cuisine, or refresh name and slug if the id already exists.
    pub async fn upsert(pool: &PgPool, cuisine: &Cuisine) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cuisine (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug
            "#,
        )
        .bind(cuisine.id)
        .bind(&cuisine.name)
        .bind(&cuisine.slug)
        .execute(pool)
        .await
        .with_context(|| format!("failed to upsert cuisine {}", cuisine.id))?;

        Ok(())
    }
}

/// Derive a slug from a cuisine name: lowercase, each whitespace character
/// replaced with `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}
