//! In-process menu store.
//!
//! Holds the catalog in memory and evaluates [`MenuFilter`] with the same
//! semantics as the PostgreSQL store. Used by tests and for running the API
//! without a database.

use std::collections::BTreeMap;
use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::filter::MenuFilter;
use super::store::MenuStore;
use super::types::{CuisineFacet, GroupSummary, MenuCursor, MenuSummary};
use crate::harvest::CatalogWriter;
use crate::models::{Cuisine, LIVE_STATUS, MenuDetail, MenuGroup, NewSetMenu, SetMenu};

#[derive(Default)]
struct Catalog {
    /// Menus by id; ids are assigned in insertion order.
    menus: BTreeMap<i32, SetMenu>,
    cuisines: BTreeMap<i32, Cuisine>,
    /// (set_menu_id, cuisine_id) pairs.
    links: Vec<(i32, i32)>,
    groups: Vec<MenuGroup>,
    next_menu_id: i32,
    next_group_id: i32,
}

impl Catalog {
    fn cuisines_of(&self, menu_id: i32) -> Vec<Cuisine> {
        let mut cuisines: Vec<Cuisine> = self
            .links
            .iter()
            .filter(|(m, _)| *m == menu_id)
            .filter_map(|(_, c)| self.cuisines.get(c).cloned())
            .collect();
        cuisines.sort_by_key(|c| c.id);
        cuisines
    }

    fn passes(&self, menu: &SetMenu, filter: &MenuFilter) -> bool {
        let cuisines = self.cuisines_of(menu.id);
        filter.matches(menu.status, cuisines.iter().map(|c| c.slug.as_str()))
    }

    /// Menus passing `filter` in listing order.
    fn ordered(&self, filter: &MenuFilter) -> Vec<&SetMenu> {
        let mut menus: Vec<&SetMenu> = self
            .menus
            .values()
            .filter(|m| self.passes(m, filter))
            .collect();
        menus.sort_by(|a, b| {
            b.number_of_orders
                .cmp(&a.number_of_orders)
                .then(a.id.cmp(&b.id))
        });
        menus
    }

    fn summary(&self, menu: &SetMenu) -> MenuSummary {
        MenuSummary {
            id: menu.id,
            name: menu.name.clone(),
            description: menu.description.clone(),
            price_per_person: menu.price_per_person,
            min_spend: menu.min_spend,
            image: menu.image.clone(),
            thumbnail: menu.thumbnail.clone(),
            is_vegan: menu.is_vegan,
            is_vegetarian: menu.is_vegetarian,
            is_halal: menu.is_halal,
            is_kosher: menu.is_kosher,
            number_of_orders: menu.number_of_orders,
            cuisines: self.cuisines_of(menu.id),
            groups: self
                .groups
                .iter()
                .filter(|g| g.set_menu_id == menu.id)
                .map(|g| GroupSummary {
                    id: g.id,
                    name: g.name.clone(),
                })
                .collect(),
        }
    }
}

/// Menu store backed by process memory.
#[derive(Default)]
pub struct MemoryMenuStore {
    catalog: RwLock<Catalog>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cuisine.
    pub fn insert_cuisine(&self, cuisine: Cuisine) {
        self.catalog.write().cuisines.insert(cuisine.id, cuisine);
    }

    /// Insert a set menu and return its id.
    ///
    /// Fails if a referenced cuisine does not exist.
    pub fn insert_menu(&self, menu: NewSetMenu) -> Result<i32> {
        let mut catalog = self.catalog.write();

        if let Some(missing) = menu
            .cuisine_ids
            .iter()
            .find(|id| !catalog.cuisines.contains_key(*id))
        {
            bail!("cuisine {missing} does not exist");
        }

        catalog.next_menu_id += 1;
        let id = catalog.next_menu_id;

        for cuisine_id in &menu.cuisine_ids {
            if !catalog.links.contains(&(id, *cuisine_id)) {
                catalog.links.push((id, *cuisine_id));
            }
        }

        for group in &menu.groups {
            catalog.next_group_id += 1;
            let group_id = catalog.next_group_id;
            catalog.groups.push(MenuGroup {
                id: group_id,
                set_menu_id: id,
                name: group.name.clone(),
                dishes_count: group.dishes_count,
                selectable_dishes_count: group.selectable_dishes_count,
            });
        }

        catalog.menus.insert(id, menu.into_set_menu(id));

        Ok(id)
    }

    /// Change the status of a menu. Returns false if it does not exist.
    pub fn set_status(&self, id: i32, status: i32) -> bool {
        match self.catalog.write().menus.get_mut(&id) {
            Some(menu) => {
                menu.status = status;
                true
            }
            None => false,
        }
    }

    /// Number of menus held, in any status.
    pub fn len(&self) -> usize {
        self.catalog.read().menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn find_cursor(&self, id: i32, filter: &MenuFilter) -> Result<Option<MenuCursor>> {
        let catalog = self.catalog.read();
        Ok(catalog
            .menus
            .get(&id)
            .filter(|m| catalog.passes(m, filter))
            .map(|m| MenuCursor {
                id: m.id,
                number_of_orders: m.number_of_orders,
            }))
    }

    async fn find_page(
        &self,
        filter: &MenuFilter,
        start: Option<&MenuCursor>,
        take: u64,
    ) -> Result<Vec<MenuSummary>> {
        let catalog = self.catalog.read();
        let take = usize::try_from(take).unwrap_or(usize::MAX);

        Ok(catalog
            .ordered(filter)
            .into_iter()
            .filter(|m| match start {
                Some(s) => {
                    m.number_of_orders < s.number_of_orders
                        || (m.number_of_orders == s.number_of_orders && m.id >= s.id)
                }
                None => true,
            })
            .take(take)
            .map(|m| catalog.summary(m))
            .collect())
    }

    async fn count(&self, filter: &MenuFilter) -> Result<u64> {
        let catalog = self.catalog.read();
        Ok(catalog.ordered(filter).len() as u64)
    }

    async fn cuisine_facets(&self) -> Result<Vec<CuisineFacet>> {
        let catalog = self.catalog.read();

        let mut totals: HashMap<i32, (i64, i64)> = HashMap::new();
        for (menu_id, cuisine_id) in &catalog.links {
            let Some(menu) = catalog.menus.get(menu_id) else {
                continue;
            };
            if menu.status != LIVE_STATUS {
                continue;
            }
            let entry = totals.entry(*cuisine_id).or_default();
            entry.0 += 1;
            entry.1 += i64::from(menu.number_of_orders);
        }

        let mut facets: Vec<CuisineFacet> = catalog
            .cuisines
            .values()
            .filter_map(|c| {
                totals.get(&c.id).map(|(count, orders)| CuisineFacet {
                    id: c.id,
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                    live_menu_count: *count,
                    total_orders: *orders,
                })
            })
            .collect();
        facets.sort_by(|a, b| b.total_orders.cmp(&a.total_orders));

        Ok(facets)
    }

    async fn dump(&self) -> Result<Vec<MenuDetail>> {
        let catalog = self.catalog.read();
        Ok(catalog
            .menus
            .values()
            .map(|m| MenuDetail {
                menu: m.clone(),
                cuisines: catalog.cuisines_of(m.id),
                groups: catalog
                    .groups
                    .iter()
                    .filter(|g| g.set_menu_id == m.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[async_trait]
impl CatalogWriter for MemoryMenuStore {
    async fn upsert_cuisine(&self, cuisine: &Cuisine) -> Result<()> {
        self.insert_cuisine(cuisine.clone());
        Ok(())
    }

    async fn create_set_menu(&self, menu: &NewSetMenu) -> Result<i32> {
        self.insert_menu(menu.clone())
    }
}
