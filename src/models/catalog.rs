//! Supporting records: states, tags and printed labels.

use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct State {
    pub state_id: i64,
    pub state_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
    pub tag_id: i64,
    pub tag_name: String,
}

/// A pre-issued label. `item_id` is the item currently carrying it, if any.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Label {
    pub label_id: i64,
    pub creation_date: DateTime<Utc>,
    pub item_id: Option<i64>,
}
