//! Listing predicate.
//!
//! The same [`MenuFilter`] drives the page fetch, the total count and the
//! cursor lookup. Pagination is only consistent if all three see the same
//! filtered universe, so every store renders it from this one value.

use crate::models::LIVE_STATUS;

/// Predicate over set menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuFilter {
    /// Required status (always live for the listing).
    pub status: i32,

    /// When set, the menu must be linked to a cuisine with this slug.
    pub cuisine_slug: Option<String>,
}

/// Build the listing predicate for an optional cuisine slug.
///
/// Blank slugs are treated as no cuisine filter.
pub fn build_filter(cuisine_slug: Option<&str>) -> MenuFilter {
    let cuisine_slug = cuisine_slug
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    MenuFilter {
        status: LIVE_STATUS,
        cuisine_slug,
    }
}

impl MenuFilter {
    /// Evaluate the predicate against a menu's status and cuisine slugs.
    pub fn matches<'a>(&self, status: i32, mut cuisine_slugs: impl Iterator<Item = &'a str>) -> bool {
        if status != self.status {
            return false;
        }
        match &self.cuisine_slug {
            Some(slug) => cuisine_slugs.any(|s| s == slug),
            None => true,
        }
    }
}
