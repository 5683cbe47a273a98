//! Dish-selection groups attached to a set menu.

use serde::{Deserialize, Serialize};

/// A named dish-selection group of a set menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroup {
    pub id: i32,
    pub set_menu_id: i32,
    pub name: String,
    pub dishes_count: i32,
    pub selectable_dishes_count: i32,
}

/// Input for creating a group alongside its set menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuGroup {
    pub name: String,
    pub dishes_count: i32,
    pub selectable_dishes_count: i32,
}
