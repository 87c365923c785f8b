use chrono::{DateTime, Utc};

/// One entry of an item's history: the state and parent it moved to.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Event {
    pub event_id: i64,
    pub event_date: DateTime<Utc>,
    pub item_id: i64,
    pub to_state: Option<i64>,
    pub parent_item_id: Option<i64>,
}
