//! Inventory routes: items, tags, labels, states.

use crate::handlers::catalog::{
    create_tag, delete_tag, issue_labels, label_item, list_labels, list_states, list_tags,
    read_label, read_tag,
};
use crate::handlers::items::{
    attach_tag, children, create, delete as delete_item, detach_tag, events, list, read, replace,
    update,
};
use crate::state::AppState;
use axum::{routing::get, routing::put, Router};

pub fn inventory_routes(state: AppState) -> Router {
    Router::new()
        .route("/items", get(list).post(create))
        .route(
            "/items/:id",
            get(read).put(replace).patch(update).delete(delete_item),
        )
        .route("/items/:id/children", get(children))
        .route("/items/:id/events", get(events))
        .route("/items/:id/tags/:tag_id", put(attach_tag).delete(detach_tag))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", get(read_tag).delete(delete_tag))
        .route("/labels", get(list_labels).post(issue_labels))
        .route("/labels/:id", get(read_label))
        .route("/labels/:id/item", get(label_item))
        .route("/states", get(list_states))
        .with_state(state)
}
