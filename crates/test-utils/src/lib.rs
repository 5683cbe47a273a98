//! Carte test utilities.
//!
//! Helpers for integration testing: catalog fixtures, builders and
//! assertion utilities for listing responses.

use chrono::{DateTime, TimeZone, Utc};

/// Status of a menu visible in the listing.
pub const LIVE: i32 = 1;

/// Status of a withdrawn menu.
pub const DRAFT: i32 = 0;

/// Create a test cuisine.
pub fn test_cuisine(id: i32, name: &str) -> TestCuisine {
    TestCuisine {
        id,
        name: name.to_string(),
    }
}

/// A cuisine fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCuisine {
    pub id: i32,
    pub name: String,
}

/// Create a live test menu with default values.
pub fn test_menu(name: &str) -> TestMenu {
    TestMenu {
        name: name.to_string(),
        description: Some(format!("{name} description")),
        status: LIVE,
        price_per_person: 25.0,
        min_spend: 150.0,
        number_of_orders: 0,
        image: format!("https://cdn.example/{}.jpg", name.to_lowercase()),
        thumbnail: format!("https://cdn.example/{}-thumb.jpg", name.to_lowercase()),
        is_vegan: false,
        is_vegetarian: false,
        is_halal: false,
        is_kosher: false,
        available: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_default(),
        cuisine_ids: Vec::new(),
        groups: Vec::new(),
    }
}

/// A set menu builder for creating test fixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct TestMenu {
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
    pub is_halal: bool,
    pub is_kosher: bool,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub cuisine_ids: Vec<i32>,
    /// Group names; every group gets `dishes_count = 4`, `selectable = 2`.
    pub groups: Vec<String>,
}

impl TestMenu {
    /// Set the popularity.
    pub fn with_orders(mut self, orders: i32) -> Self {
        self.number_of_orders = orders;
        self
    }

    /// Link to cuisines by id.
    pub fn with_cuisines(mut self, ids: &[i32]) -> Self {
        self.cuisine_ids = ids.to_vec();
        self
    }

    /// Set pricing.
    pub fn with_prices(mut self, price_per_person: f64, min_spend: f64) -> Self {
        self.price_per_person = price_per_person;
        self.min_spend = min_spend;
        self
    }

    /// Add a dish-selection group.
    pub fn with_group(mut self, name: &str) -> Self {
        self.groups.push(name.to_string());
        self
    }

    /// Set as not live.
    pub fn draft(mut self) -> Self {
        self.status = DRAFT;
        self
    }

    /// Set as vegan (and therefore vegetarian).
    pub fn vegan(mut self) -> Self {
        self.is_vegan = true;
        self.is_vegetarian = true;
        self
    }
}

/// Assertion helpers for listing responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON to lack key '{}', got: {}",
            key,
            value
        );
    }

    /// Ids of the `data` array of a listing response, in order.
    pub fn menu_ids(value: &Value) -> Vec<i64> {
        value["data"]
            .as_array()
            .map(|menus| menus.iter().filter_map(|m| m["id"].as_i64()).collect())
            .unwrap_or_default()
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }
}
