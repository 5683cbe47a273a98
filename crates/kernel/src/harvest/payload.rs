//! Upstream payload types and validation.
//!
//! The upstream document is `{"data": [ApiSetMenu, ...]}`. Dietary and
//! format flags arrive as 0/1 integers; group selection arrives as an
//! object mapping group names to 0/1 in display order.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use super::service::HarvestError;
use crate::models::{Cuisine, NewMenuGroup, NewSetMenu};

/// Top-level upstream document.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub data: Vec<ApiSetMenu>,
}

/// Cuisine reference inside an upstream menu.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCuisine {
    pub id: i32,
    pub name: String,
}

/// Group selection block of an upstream menu.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiGroups {
    pub dishes_count: i32,
    pub selectable_dishes_count: i32,
    pub groups: GroupFlags,
}

/// Group name to enabled flag, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFlags(pub Vec<(String, f64)>);

impl GroupFlags {
    /// Names of the groups flagged `1`, in document order.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, flag)| *flag == 1.0)
            .map(|(name, _)| name.as_str())
    }
}

impl<'de> Deserialize<'de> for GroupFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagsVisitor;

        impl<'de> Visitor<'de> for FlagsVisitor {
            type Value = GroupFlags;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of group names to numeric flags")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, flag)) = map.next_entry::<String, f64>()? {
                    entries.push((name, flag));
                }
                Ok(GroupFlags(entries))
            }
        }

        deserializer.deserialize_map(FlagsVisitor)
    }
}

/// One upstream set menu.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSetMenu {
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub status: i32,
    pub price_per_person: f64,
    pub min_spend: f64,
    pub number_of_orders: i32,
    pub image: String,
    pub thumbnail: String,
    pub is_vegan: f64,
    pub is_vegetarian: f64,
    pub is_seated: f64,
    pub is_standing: f64,
    pub is_canape: f64,
    pub is_mixed_dietary: f64,
    pub is_meal_prep: f64,
    pub is_halal: f64,
    pub is_kosher: f64,
    pub display_text: f64,
    pub price_includes: Option<String>,
    pub highlight: Option<String>,
    pub available: bool,
    pub cuisines: Vec<ApiCuisine>,
    pub groups: ApiGroups,
}

/// A validated menu ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestRecord {
    /// Cuisines to upsert before the menu is created.
    pub cuisines: Vec<Cuisine>,
    pub menu: NewSetMenu,
}

impl ApiSetMenu {
    /// Validate and convert into a write-ready record.
    pub fn into_record(self) -> Result<HarvestRecord, HarvestError> {
        let created_at = parse_timestamp(&self.created_at).ok_or_else(|| {
            HarvestError::InvalidPayload(format!(
                "menu '{}' has unparseable created_at '{}'",
                self.name, self.created_at
            ))
        })?;

        let cuisines: Vec<Cuisine> = self
            .cuisines
            .iter()
            .map(|c| Cuisine::from_name(c.id, c.name.as_str()))
            .collect();

        let groups = self
            .groups
            .groups
            .enabled()
            .map(|name| NewMenuGroup {
                name: name.to_string(),
                dishes_count: self.groups.dishes_count,
                selectable_dishes_count: self.groups.selectable_dishes_count,
            })
            .collect();

        let menu = NewSetMenu {
            cuisine_ids: cuisines.iter().map(|c| c.id).collect(),
            groups,
            name: self.name,
            description: self.description,
            status: self.status,
            price_per_person: self.price_per_person,
            min_spend: self.min_spend,
            number_of_orders: self.number_of_orders,
            image: self.image,
            thumbnail: self.thumbnail,
            is_vegan: self.is_vegan != 0.0,
            is_vegetarian: self.is_vegetarian != 0.0,
            is_seated: self.is_seated != 0.0,
            is_standing: self.is_standing != 0.0,
            is_canape: self.is_canape != 0.0,
            is_mixed_dietary: self.is_mixed_dietary != 0.0,
            is_meal_prep: self.is_meal_prep != 0.0,
            is_halal: self.is_halal != 0.0,
            is_kosher: self.is_kosher != 0.0,
            display_text: self.display_text != 0.0,
            price_includes: self.price_includes,
            highlight: self.highlight,
            available: self.available,
            created_at,
        };

        Ok(HarvestRecord { cuisines, menu })
    }
}

/// Parse and validate a whole upstream document.
///
/// All-or-nothing: a single malformed menu rejects the document.
pub fn parse_payload(body: &[u8]) -> Result<Vec<HarvestRecord>, HarvestError> {
    let response: ApiResponse = serde_json::from_slice(body)
        .map_err(|e| HarvestError::InvalidPayload(e.to_string()))?;

    response
        .data
        .into_iter()
        .map(ApiSetMenu::into_record)
        .collect()
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) and bare dates.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn menu_json(name: &str, created_at: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "description": "Three courses",
            "created_at": created_at,
            "status": 1,
            "price_per_person": 32.5,
            "min_spend": 200,
            "number_of_orders": 14,
            "image": "https://cdn.example/menu.jpg",
            "thumbnail": "https://cdn.example/menu-thumb.jpg",
            "is_vegan": 0,
            "is_vegetarian": 1,
            "is_seated": 1,
            "is_standing": 0,
            "is_canape": 0,
            "is_mixed_dietary": 0,
            "is_meal_prep": 0,
            "is_halal": 1,
            "is_kosher": 0,
            "display_text": 0,
            "price_includes": null,
            "highlight": "Chef favourite",
            "available": true,
            "cuisines": [
                { "id": 4, "name": "Middle Eastern" },
                { "id": 9, "name": "Italian" }
            ],
            "groups": {
                "dishes_count": 6,
                "selectable_dishes_count": 3,
                "groups": { "Starters": 1, "Mains": 1, "Canapes": 0, "Desserts": 1 }
            }
        })
    }

    fn document(menus: Vec<serde_json::Value>) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({ "data": menus })).unwrap()
    }

    #[test]
    fn parses_valid_document() {
        let body = document(vec![menu_json("Feast", "2024-02-01T18:30:00.000000Z")]);
        let records = parse_payload(&body).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.menu.name, "Feast");
        assert_eq!(record.menu.min_spend, 200.0);
        assert!(record.menu.is_vegetarian);
        assert!(record.menu.is_halal);
        assert!(!record.menu.is_vegan);
        assert_eq!(record.menu.cuisine_ids, vec![4, 9]);
        assert_eq!(record.cuisines[0].slug, "middle-eastern");
        assert_eq!(record.menu.created_at.year(), 2024);
        assert_eq!(record.menu.created_at.hour(), 18);
    }

    #[test]
    fn keeps_only_enabled_groups_in_document_order() {
        let body = document(vec![menu_json("Feast", "2024-02-01T18:30:00Z")]);
        let records = parse_payload(&body).unwrap();

        let names: Vec<&str> = records[0]
            .menu
            .groups
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["Starters", "Mains", "Desserts"]);
        assert!(records[0].menu.groups.iter().all(|g| g.dishes_count == 6));
        assert!(
            records[0]
                .menu
                .groups
                .iter()
                .all(|g| g.selectable_dishes_count == 3)
        );
    }

    #[test]
    fn accepts_space_separated_timestamps() {
        let body = document(vec![menu_json("Feast", "2023-11-05 09:15:00")]);
        let records = parse_payload(&body).unwrap();
        assert_eq!(records[0].menu.created_at.month(), 11);
    }

    #[test]
    fn accepts_fractional_notation_flags() {
        let mut menu = menu_json("Feast", "2024-02-01T18:30:00Z");
        menu["is_vegan"] = serde_json::json!(1.0);
        menu["is_halal"] = serde_json::json!(0.0);
        menu["groups"]["groups"] = serde_json::json!({ "Starters": 1.0, "Mains": 0.0 });

        let records = parse_payload(&document(vec![menu])).unwrap();
        let record = &records[0].menu;
        assert!(record.is_vegan);
        assert!(!record.is_halal);
        let names: Vec<&str> = record.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Starters"]);
    }

    #[test]
    fn rejects_non_numeric_flags() {
        let mut menu = menu_json("Feast", "2024-02-01T18:30:00Z");
        menu["is_vegan"] = serde_json::json!("yes");

        let err = parse_payload(&document(vec![menu])).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let mut menu = menu_json("Feast", "2024-02-01T18:30:00Z");
        menu.as_object_mut().unwrap().remove("price_per_person");

        let err = parse_payload(&document(vec![menu])).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_wrong_types() {
        let mut menu = menu_json("Feast", "2024-02-01T18:30:00Z");
        menu["status"] = serde_json::json!("live");

        let err = parse_payload(&document(vec![menu])).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidPayload(_)));
    }

    #[test]
    fn one_bad_record_rejects_the_document() {
        let body = document(vec![
            menu_json("Good", "2024-02-01T18:30:00Z"),
            menu_json("Bad", "sometime last week"),
        ]);

        let err = parse_payload(&body).unwrap_err();
        match err {
            HarvestError::InvalidPayload(msg) => assert!(msg.contains("Bad"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_object_document() {
        assert!(matches!(
            parse_payload(b"[]").unwrap_err(),
            HarvestError::InvalidPayload(_)
        ));
        assert!(matches!(
            parse_payload(b"not json").unwrap_err(),
            HarvestError::InvalidPayload(_)
        ));
    }

    #[test]
    fn empty_document_is_valid() {
        assert!(parse_payload(br#"{"data": []}"#).unwrap().is_empty());
    }
}
