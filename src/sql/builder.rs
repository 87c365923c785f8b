//! Builds the item SELECTs. Identifiers are fixed here; every caller value is a parameter.

use super::BindValue;
use crate::models::ItemFilter;

/// Columns of `models::Item`, joined with the state name and the direct child count.
pub const ITEM_SELECT: &str = "SELECT i.item_id, i.name, i.quantity, i.location, i.comment, \
     i.label_id, i.parent_item_id, i.state_id, s.state_name, i.image_lg_path, i.image_sm_path, \
     i.creation_date, i.last_update, \
     (SELECT COUNT(*) FROM items c WHERE c.parent_item_id = i.item_id) AS children_count \
     FROM items i LEFT JOIN states s ON s.state_id = i.state_id";

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new(sql: impl Into<String>) -> Self {
        QueryBuf {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<BindValue>) {
        self.params.push(v.into());
    }
}

/// SELECT one item by id. Caller binds the id.
pub fn select_item_by_id() -> String {
    format!("{} WHERE i.item_id = ?", ITEM_SELECT)
}

/// SELECT items matching every set filter, ordered by id, with limit and offset.
pub fn select_items(filter: &ItemFilter) -> QueryBuf {
    let mut q = QueryBuf::new(ITEM_SELECT);
    let mut conditions: Vec<&str> = Vec::new();

    if filter.root_only {
        conditions.push("i.parent_item_id IS NULL");
    }
    if let Some(parent) = filter.parent_item_id {
        conditions.push("i.parent_item_id = ?");
        q.push_param(parent);
    }
    if let Some(state) = filter.state_id {
        conditions.push("i.state_id = ?");
        q.push_param(state);
    }
    if let Some(label) = filter.label_id {
        conditions.push("i.label_id = ?");
        q.push_param(label);
    }
    if let Some(tag) = filter.tag_id {
        conditions.push("EXISTS (SELECT 1 FROM item_tags it WHERE it.item_id = i.item_id AND it.tag_id = ?)");
        q.push_param(tag);
    }
    if let Some(name) = &filter.name_contains {
        conditions.push("i.name LIKE ? ESCAPE '\\'");
        q.push_param(format!("%{}%", escape_like(name)));
    }

    if !conditions.is_empty() {
        q.sql.push_str(" WHERE ");
        q.sql.push_str(&conditions.join(" AND "));
    }
    q.sql.push_str(" ORDER BY i.item_id LIMIT ? OFFSET ?");
    q.push_param(i64::from(filter.limit));
    q.push_param(i64::from(filter.offset));
    q
}

/// SELECT (item_id, tag_id, tag_name) for all given items, in tag name order.
pub fn select_tags_for_items(item_ids: &[i64]) -> QueryBuf {
    let placeholders = vec!["?"; item_ids.len()].join(", ");
    let mut q = QueryBuf::new(format!(
        "SELECT it.item_id, t.tag_id, t.tag_name FROM item_tags it \
         JOIN tags t ON t.tag_id = it.tag_id \
         WHERE it.item_id IN ({}) ORDER BY t.tag_name, t.tag_id",
        placeholders
    ));
    for id in item_ids {
        q.push_param(*id);
    }
    q
}

/// Escape LIKE wildcards so user text matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
