//! PostgreSQL-backed menu store.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::filter::MenuFilter;
use super::query_builder::MenuQueryBuilder;
use super::store::MenuStore;
use super::types::{CuisineFacet, GroupSummary, MenuCursor, MenuSummary};
use crate::db;
use crate::harvest::CatalogWriter;
use crate::models::{Cuisine, MenuDetail, NewSetMenu, SetMenu};

/// Facets over live menus. The join table's primary key guarantees one row
/// per (menu, cuisine) pair, so COUNT(*) counts distinct menus.
const FACETS_SQL: &str = r#"
SELECT c.id, c.name, c.slug,
       COUNT(*) AS live_menu_count,
       COALESCE(SUM(m.number_of_orders), 0)::BIGINT AS total_orders
FROM cuisine c
INNER JOIN set_menu_cuisine smc ON smc.cuisine_id = c.id
INNER JOIN set_menu m ON m.id = smc.set_menu_id
WHERE m.status = 1
GROUP BY c.id, c.name, c.slug
ORDER BY total_orders DESC, c.id ASC
"#;

/// Store reading and writing the catalog tables through a connection pool.
#[derive(Clone)]
pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach cuisines and groups to a page of menus with two batched queries.
    async fn load_relations(&self, menus: &mut [MenuSummary]) -> Result<()> {
        if menus.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = menus.iter().map(|m| m.id).collect();

        #[derive(sqlx::FromRow)]
        struct CuisineLink {
            set_menu_id: i32,
            id: i32,
            name: String,
            slug: String,
        }

        #[derive(sqlx::FromRow)]
        struct GroupRow {
            set_menu_id: i32,
            id: i32,
            name: String,
        }

        let links = sqlx::query_as::<_, CuisineLink>(
            r#"
            SELECT smc.set_menu_id, c.id, c.name, c.slug
            FROM set_menu_cuisine smc
            INNER JOIN cuisine c ON c.id = smc.cuisine_id
            WHERE smc.set_menu_id = ANY($1)
            ORDER BY smc.set_menu_id, c.id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await
        .context("failed to load menu cuisines")?;

        let groups = sqlx::query_as::<_, GroupRow>(
            "SELECT set_menu_id, id, name FROM menu_group WHERE set_menu_id = ANY($1) ORDER BY set_menu_id, id",
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await
        .context("failed to load menu groups")?;

        let mut cuisines: HashMap<i32, Vec<Cuisine>> = HashMap::new();
        for link in links {
            cuisines.entry(link.set_menu_id).or_default().push(Cuisine {
                id: link.id,
                name: link.name,
                slug: link.slug,
            });
        }

        let mut group_map: HashMap<i32, Vec<GroupSummary>> = HashMap::new();
        for group in groups {
            group_map
                .entry(group.set_menu_id)
                .or_default()
                .push(GroupSummary {
                    id: group.id,
                    name: group.name,
                });
        }

        for menu in menus.iter_mut() {
            menu.cuisines = cuisines.remove(&menu.id).unwrap_or_default();
            menu.groups = group_map.remove(&menu.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn find_cursor(&self, id: i32, filter: &MenuFilter) -> Result<Option<MenuCursor>> {
        let sql = MenuQueryBuilder::new(filter).build_cursor_lookup(id);

        let cursor = sqlx::query_as::<_, MenuCursor>(&sql)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up cursor")?;

        Ok(cursor)
    }

    async fn find_page(
        &self,
        filter: &MenuFilter,
        start: Option<&MenuCursor>,
        take: u64,
    ) -> Result<Vec<MenuSummary>> {
        let sql = MenuQueryBuilder::new(filter).build_page(start, take);

        let mut menus = sqlx::query_as::<_, MenuSummary>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("failed to fetch menu page")?;

        self.load_relations(&mut menus).await?;

        Ok(menus)
    }

    async fn count(&self, filter: &MenuFilter) -> Result<u64> {
        let sql = MenuQueryBuilder::new(filter).build_count();

        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .context("failed to count menus")?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn cuisine_facets(&self) -> Result<Vec<CuisineFacet>> {
        let facets = sqlx::query_as::<_, CuisineFacet>(FACETS_SQL)
            .fetch_all(&self.pool)
            .await
            .context("failed to aggregate cuisine facets")?;

        Ok(facets)
    }

    async fn dump(&self) -> Result<Vec<MenuDetail>> {
        SetMenu::list_details(&self.pool).await
    }

    async fn ping(&self) -> bool {
        db::check_health(&self.pool).await
    }
}

#[async_trait]
impl CatalogWriter for PgMenuStore {
    async fn upsert_cuisine(&self, cuisine: &Cuisine) -> Result<()> {
        Cuisine::upsert(&self.pool, cuisine).await
    }

    async fn create_set_menu(&self, menu: &NewSetMenu) -> Result<i32> {
        SetMenu::create(&self.pool, menu).await
    }
}
