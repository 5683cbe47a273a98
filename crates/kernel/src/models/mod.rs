//! Database models.

pub mod cuisine;
pub mod menu_group;
pub mod set_menu;

pub use cuisine::{Cuisine, slugify};
pub use menu_group::{MenuGroup, NewMenuGroup};
pub use set_menu::{LIVE_STATUS, MenuDetail, NewSetMenu, SetMenu, total_price};
