//! Inventory item record and the mutable field set used for inserts and updates.

use super::Tag;
use chrono::{DateTime, Utc};

/// Stored item joined with its state name, child count and tags.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Item {
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
    #[sqlx(skip)]
    pub tags: Vec<Tag>,
}

impl Item {
    /// The caller-controlled fields of this record.
    pub fn fields(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            quantity: self.quantity,
            location: self.location.clone(),
            comment: self.comment.clone(),
            label_id: self.label_id,
            parent_item_id: self.parent_item_id,
            state_id: self.state_id,
            image_lg_path: self.image_lg_path.clone(),
            image_sm_path: self.image_sm_path.clone(),
        }
    }
}

/// Every caller-controlled field of an item, already validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
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

/// Partial update. `None` leaves a field unchanged; `Some(None)` clears a nullable field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub location: Option<Option<String>>,
    pub comment: Option<Option<String>>,
    pub label_id: Option<Option<i64>>,
    pub parent_item_id: Option<Option<i64>>,
    pub state_id: Option<Option<i64>>,
    pub image_lg_path: Option<Option<String>>,
    pub image_sm_path: Option<Option<String>>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        *self == ItemChanges::default()
    }

    pub fn apply(self, mut base: NewItem) -> NewItem {
        if let Some(v) = self.name {
            base.name = v;
        }
        if let Some(v) = self.quantity {
            base.quantity = v;
        }
        if let Some(v) = self.location {
            base.location = v;
        }
        if let Some(v) = self.comment {
            base.comment = v;
        }
        if let Some(v) = self.label_id {
            base.label_id = v;
        }
        if let Some(v) = self.parent_item_id {
            base.parent_item_id = v;
        }
        if let Some(v) = self.state_id {
            base.state_id = v;
        }
        if let Some(v) = self.image_lg_path {
            base.image_lg_path = v;
        }
        if let Some(v) = self.image_sm_path {
            base.image_sm_path = v;
        }
        base
    }
}

impl From<NewItem> for ItemChanges {
    /// Full replacement: every field is set, absent optionals are cleared.
    fn from(item: NewItem) -> Self {
        ItemChanges {
            name: Some(item.name),
            quantity: Some(item.quantity),
            location: Some(item.location),
            comment: Some(item.comment),
            label_id: Some(item.label_id),
            parent_item_id: Some(item.parent_item_id),
            state_id: Some(item.state_id),
            image_lg_path: Some(item.image_lg_path),
            image_sm_path: Some(item.image_sm_path),
        }
    }
}

/// Filters for listing items. All set filters must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub parent_item_id: Option<i64>,
    /// Only items without a parent.
    pub root_only: bool,
    pub state_id: Option<i64>,
    pub label_id: Option<i64>,
    pub tag_id: Option<i64>,
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    pub limit: u32,
    pub offset: u32,
}
