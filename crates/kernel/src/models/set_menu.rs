//! Set menu model.
//!
//! A set menu is a pre-configured event menu priced per guest with a
//! minimum spend. Only menus whose `status` is [`LIVE_STATUS`] are visible
//! in the catalog listing; every other status is kept for the debug dump.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::cuisine::Cuisine;
use super::menu_group::{MenuGroup, NewMenuGroup};

/// Status value of a publicly visible menu.
pub const LIVE_STATUS: i32 = 1;

/// Set menu record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SetMenu {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,

    /// Visibility status (1 = live).
    pub status: i32,

    pub price_per_person: f64,
    pub min_spend: f64,

    /// Popularity metric used to order the listing.
    pub number_of_orders: i32,

    pub image: String,
    pub thumbnail: String,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub is_seated: bool,
    pub is_standing: bool,
    pub is_canape: bool,
    pub is_mixed_dietary: bool,
    pub is_meal_prep: bool,
    pub is_halal: bool,
    pub is_kosher: bool,
    pub display_text: bool,
    pub price_includes: Option<String>,
    pub highlight: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

/// Set menu together with its cuisines and groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDetail {
    #[serde(flatten)]
    pub menu: SetMenu,
    pub cuisines: Vec<Cuisine>,
    pub groups: Vec<MenuGroup>,
}

/// Input for creating a set menu with its cuisine links and groups.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSetMenu {
    pub name: String,
    pub description: Option<String>,
    pub status: i32,
    pub price_per_person: f64,
    pub min_spend: f64,
    pub number_of_orders: i32,
    pub image: String,
    pub thumbnail: String,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub is_seated: bool,
    pub is_standing: bool,
    pub is_canape: bool,
    pub is_mixed_dietary: bool,
    pub is_meal_prep: bool,
    pub is_halal: bool,
    pub is_kosher: bool,
    pub display_text: bool,
    pub price_includes: Option<String>,
    pub highlight: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,

    /// Ids of cuisines that must already exist.
    pub cuisine_ids: Vec<i32>,

    pub groups: Vec<NewMenuGroup>,
}

impl NewSetMenu {
    /// Materialize the record the store would hold once `id` is assigned.
    pub fn into_set_menu(self, id: i32) -> SetMenu {
        SetMenu {
            id,
            name: self.name,
            description: self.description,
            status: self.status,
            price_per_person: self.price_per_person,
            min_spend: self.min_spend,
            number_of_orders: self.number_of_orders,
            image: self.image,
            thumbnail: self.thumbnail,
            is_vegan: self.is_vegan,
            is_vegetarian: self.is_vegetarian,
            is_seated: self.is_seated,
            is_standing: self.is_standing,
            is_canape: self.is_canape,
            is_mixed_dietary: self.is_mixed_dietary,
            is_meal_prep: self.is_meal_prep,
            is_halal: self.is_halal,
            is_kosher: self.is_kosher,
            display_text: self.display_text,
            price_includes: self.price_includes,
            highlight: self.highlight,
            available: self.available,
            created_at: self.created_at,
        }
    }
}

/// Price of a menu for `guests`: per-person price times guests, but never
/// below the minimum spend.
pub fn total_price(price_per_person: f64, min_spend: f64, guests: u32) -> f64 {
    (price_per_person * f64::from(guests)).max(min_spend)
}

impl SetMenu {
    /// Create a set menu, its cuisine links and its groups in one transaction.
    ///
    /// Returns the id assigned to the new menu.
    pub async fn create(pool: &PgPool, input: &NewSetMenu) -> Result<i32> {
        let mut tx = pool.begin().await.context("failed to start transaction")?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO set_menu (
                name, description, status, price_per_person, min_spend, number_of_orders,
                image, thumbnail, is_vegan, is_vegetarian, is_seated, is_standing, is_canape,
                is_mixed_dietary, is_meal_prep, is_halal, is_kosher, display_text,
                price_includes, highlight, available, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status)
        .bind(input.price_per_person)
        .bind(input.min_spend)
        .bind(input.number_of_orders)
        .bind(&input.image)
        .bind(&input.thumbnail)
        .bind(input.is_vegan)
        .bind(input.is_vegetarian)
        .bind(input.is_seated)
        .bind(input.is_standing)
        .bind(input.is_canape)
        .bind(input.is_mixed_dietary)
        .bind(input.is_meal_prep)
        .bind(input.is_halal)
        .bind(input.is_kosher)
        .bind(input.display_text)
        .bind(&input.price_includes)
        .bind(&input.highlight)
        .bind(input.available)
        .bind(input.created_at)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert set menu")?;

        for cuisine_id in &input.cuisine_ids {
            sqlx::query(
                "INSERT INTO set_menu_cuisine (set_menu_id, cuisine_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(cuisine_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to link set menu {id} to cuisine {cuisine_id}"))?;
        }

        for group in &input.groups {
            sqlx::query(
                r#"
                INSERT INTO menu_group (set_menu_id, name, dishes_count, selectable_dishes_count)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(&group.name)
            .bind(group.dishes_count)
            .bind(group.selectable_dishes_count)
            .execute(&mut *tx)
            .await
            .context("failed to insert menu group")?;
        }

        tx.commit().await.context("failed to commit set menu")?;

        Ok(id)
    }

    /// Load every set menu, regardless of status, with cuisines and groups.
    pub async fn list_details(pool: &PgPool) -> Result<Vec<MenuDetail>> {
        let menus = sqlx::query_as::<_, SetMenu>(
            r#"
            SELECT id, name, description, status, price_per_person, min_spend, number_of_orders,
                   image, thumbnail, is_vegan, is_vegetarian, is_seated, is_standing, is_canape,
                   is_mixed_dietary, is_meal_prep, is_halal, is_kosher, display_text,
                   price_includes, highlight, available, created_at
            FROM set_menu
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list set menus")?;

        #[derive(sqlx::FromRow)]
        struct LinkRow {
            set_menu_id: i32,
            id: i32,
            name: String,
            slug: String,
        }

        let links = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT smc.set_menu_id, c.id, c.name, c.slug
            FROM set_menu_cuisine smc
            INNER JOIN cuisine c ON c.id = smc.cuisine_id
            ORDER BY smc.set_menu_id, c.id
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list set menu cuisines")?;

        let groups = sqlx::query_as::<_, MenuGroup>(
            "SELECT id, set_menu_id, name, dishes_count, selectable_dishes_count FROM menu_group ORDER BY set_menu_id, id",
        )
        .fetch_all(pool)
        .await
        .context("failed to list menu groups")?;

        let mut cuisines_by_menu: HashMap<i32, Vec<Cuisine>> = HashMap::new();
        for link in links {
            cuisines_by_menu
                .entry(link.set_menu_id)
                .or_default()
                .push(Cuisine {
                    id: link.id,
                    name: link.name,
                    slug: link.slug,
                });
        }

        let mut groups_by_menu: HashMap<i32, Vec<MenuGroup>> = HashMap::new();
        for group in groups {
            groups_by_menu.entry(group.set_menu_id).or_default().push(group);
        }

        Ok(menus
            .into_iter()
            .map(|menu| MenuDetail {
                cuisines: cuisines_by_menu.remove(&menu.id).unwrap_or_default(),
                groups: groups_by_menu.remove(&menu.id).unwrap_or_default(),
                menu,
            })
            .collect())
    }
}
