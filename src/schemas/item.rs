//! Item payloads (create, full replace, partial update), list query and response body.

use super::rules::{self, FieldReader};
use super::{FromPayload, TagResponse};
use crate::error::ValidationError;
use crate::models::{Item, ItemChanges, ItemFilter, NewItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_QUANTITY: i64 = 1;
pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

const ITEM_FIELDS: &[&str] = &[
    "name",
    "quantity",
    "location",
    "comment",
    "label_id",
    "parent_item_id",
    "state_id",
    "image_lg_path",
    "image_sm_path",
];

/// Body of POST /items and PUT /items/:id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemCreate {
    pub name: String,
    pub quantity: i64,
    pub location: Option<String>,
    pub comment: Option<String>,
    pub label_id: Option<i64>,
    pub parent_item_id: Option<i64>,
    pub state_id: Option<i64>,
    pub image_lg_path: Option<String>,
    pub image_sm_path: Option<String>,
}

impl FromPayload for ItemCreate {
    fn from_payload(value: Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::object(value, ITEM_FIELDS)?;
        let name = r.required_text("name", &rules::NAME);
        let quantity = match r.patch_required_integer("quantity", &rules::QUANTITY) {
            Some(q) => q,
            None => DEFAULT_QUANTITY,
        };
        let item = ItemCreate {
            name: name.unwrap_or_default(),
            quantity,
            location: r.text("location", &rules::LOCATION),
            comment: r.text("comment", &rules::COMMENT),
            label_id: r.integer("label_id", &rules::ID),
            parent_item_id: r.integer("parent_item_id", &rules::ID),
            state_id: r.integer("state_id", &rules::ID),
            image_lg_path: r.text("image_lg_path", &rules::IMAGE_PATH),
            image_sm_path: r.text("image_sm_path", &rules::IMAGE_PATH),
        };
        r.finish()?;
        Ok(item)
    }
}

impl From<ItemCreate> for NewItem {
    fn from(p: ItemCreate) -> Self {
        NewItem {
            name: p.name,
            quantity: p.quantity,
            location: p.location,
            comment: p.comment,
            label_id: p.label_id,
            parent_item_id: p.parent_item_id,
            state_id: p.state_id,
            image_lg_path: p.image_lg_path,
            image_sm_path: p.image_sm_path,
        }
    }
}

/// Body of PATCH /items/:id. Absent fields stay unchanged; null clears a nullable field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemUpdate(pub ItemChanges);

impl FromPayload for ItemUpdate {
    fn from_payload(value: Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::object(value, ITEM_FIELDS)?;
        let changes = ItemChanges {
            name: r.patch_required_text("name", &rules::NAME),
            quantity: r.patch_required_integer("quantity", &rules::QUANTITY),
            location: r.patch_text("location", &rules::LOCATION),
            comment: r.patch_text("comment", &rules::COMMENT),
            label_id: r.patch_integer("label_id", &rules::ID),
            parent_item_id: r.patch_integer("parent_item_id", &rules::ID),
            state_id: r.patch_integer("state_id", &rules::ID),
            image_lg_path: r.patch_text("image_lg_path", &rules::IMAGE_PATH),
            image_sm_path: r.patch_text("image_sm_path", &rules::IMAGE_PATH),
        };
        r.finish()?;
        Ok(ItemUpdate(changes))
    }
}

/// Query string of GET /items. Unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemQuery(pub ItemFilter);

impl ItemQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();
        let mut filter = ItemFilter {
            limit: DEFAULT_LIMIT,
            ..ItemFilter::default()
        };
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();
        for k in keys {
            let v = params[k].trim();
            match k.as_str() {
                "parent_item_id" => filter.parent_item_id = parse_id(k, v, &mut errors),
                "state_id" => filter.state_id = parse_id(k, v, &mut errors),
                "label_id" => filter.label_id = parse_id(k, v, &mut errors),
                "tag_id" => filter.tag_id = parse_id(k, v, &mut errors),
                "root" => match v {
                    "true" | "1" => filter.root_only = true,
                    "false" | "0" | "" => filter.root_only = false,
                    _ => errors.push("root", "must be true or false"),
                },
                "q" => {
                    if !v.is_empty() {
                        filter.name_contains = Some(v.to_string());
                    }
                }
                "limit" => match v.parse::<u32>() {
                    Ok(n) if (1..=MAX_LIMIT).contains(&n) => filter.limit = n,
                    _ => errors.push("limit", format!("must be an integer between 1 and {}", MAX_LIMIT)),
                },
                "offset" => match v.parse::<u32>() {
                    Ok(n) => filter.offset = n,
                    Err(_) => errors.push("offset", "must be a non-negative integer"),
                },
                _ => {}
            }
        }
        if filter.root_only && filter.parent_item_id.is_some() {
            errors.push("root", "cannot be combined with parent_item_id");
        }
        errors.into_result()?;
        Ok(ItemQuery(filter))
    }
}

fn parse_id(field: &str, raw: &str, errors: &mut ValidationError) -> Option<i64> {
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Some(n),
        _ => {
            errors.push(field, "must be a positive integer");
            None
        }
    }
}

/// External representation of an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub location: Option<String>,
    pub comment: Option<String>,
    pub label_id: Option<i64>,
    pub parent_item_id: Option<i64>,
    pub state_id: Option<i64>,
    pub state_name: Option<String>,
    pub image_lg_path: Option<String>,
    pub image_sm_path: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub last_update: Option<DateTime<Utc>>,
    pub children_count: i64,
    pub tags: Vec<TagResponse>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        ItemResponse {
            item_id: item.item_id,
            name: item.name,
            quantity: item.quantity,
            location: item.location,
            comment: item.comment,
            label_id: item.label_id,
            parent_item_id: item.parent_item_id,
            state_id: item.state_id,
            state_name: item.state_name,
            image_lg_path: item.image_lg_path,
            image_sm_path: item.image_sm_path,
            creation_date: item.creation_date,
            last_update: item.last_update,
            children_count: item.children_count,
            tags: item.tags.into_iter().map(TagResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use serde_json::json;

    #[test]
    fn create_applies_defaults() {
        let p = ItemCreate::from_payload(json!({"name": "Hammer"})).unwrap();
        assert_eq!(p.name, "Hammer");
        assert_eq!(p.quantity, DEFAULT_QUANTITY);
        assert_eq!(p.parent_item_id, None);
    }

    #[test]
    fn create_reports_all_violations() {
        let err = ItemCreate::from_payload(json!({
            "quantity": -1,
            "parent_item_id": 0,
            "image_lg_path": "../x.png",
            "colour": "red"
        }))
        .unwrap_err();
        for field in ["name", "quantity", "parent_item_id", "image_lg_path", "colour"] {
            assert!(err.has_field(field), "missing error for {}", field);
        }
        assert_eq!(err.errors.len(), 5);
    }

    #[test]
    fn create_stores_blank_location_as_null() {
        let p = ItemCreate::from_payload(json!({"name": "Lamp", "location": "   "})).unwrap();
        assert_eq!(p.location, None);
    }

    #[test]
    fn create_rejects_null_quantity() {
        let err = ItemCreate::from_payload(json!({"name": "x", "quantity": null})).unwrap_err();
        assert!(err.has_field("quantity"));
    }

    #[test]
    fn update_keeps_absent_fields_and_clears_nulls() {
        let ItemUpdate(changes) =
            ItemUpdate::from_payload(json!({"quantity": 4, "comment": null, "parent_item_id": null})).unwrap();
        assert_eq!(changes.quantity, Some(4));
        assert_eq!(changes.comment, Some(None));
        assert_eq!(changes.parent_item_id, Some(None));
        assert_eq!(changes.name, None);
        assert_eq!(changes.location, None);
    }

    #[test]
    fn empty_update_is_valid_and_empty() {
        let ItemUpdate(changes) = ItemUpdate::from_payload(json!({})).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn query_parses_filters_and_paging() {
        let params: HashMap<String, String> = [
            ("parent_item_id", "7"),
            ("tag_id", "2"),
            ("q", " drill "),
            ("limit", "5"),
            ("offset", "10"),
            ("unrelated", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let ItemQuery(f) = ItemQuery::from_params(&params).unwrap();
        assert_eq!(f.parent_item_id, Some(7));
        assert_eq!(f.tag_id, Some(2));
        assert_eq!(f.name_contains.as_deref(), Some("drill"));
        assert_eq!((f.limit, f.offset), (5, 10));
    }

    #[test]
    fn query_reports_bad_values() {
        let params: HashMap<String, String> = [("limit", "5000"), ("state_id", "abc"), ("root", "maybe")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let err = ItemQuery::from_params(&params).unwrap_err();
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn response_round_trips_through_json() {
        let item = Item {
            item_id: 12,
            name: "Camping stove".into(),
            quantity: 1,
            location: Some("Garage".into()),
            comment: None,
            label_id: Some(4),
            parent_item_id: Some(3),
            state_id: Some(1),
            state_name: Some("stored".into()),
            image_lg_path: Some("img/stove.jpg".into()),
            image_sm_path: None,
            creation_date: "2024-05-01T10:00:00.123456Z".parse().unwrap(),
            last_update: None,
            children_count: 2,
            tags: vec![Tag { tag_id: 1, tag_name: "outdoor".into() }],
        };
        let response = ItemResponse::from(item);
        let json = serde_json::to_string(&response).unwrap();
        let back: ItemResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }
}
