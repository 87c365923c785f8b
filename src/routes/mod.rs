//! Routers and the assembled application.

mod common;
mod inventory;

pub use common::common_routes;
pub use inventory::inventory_routes;

use crate::config::Settings;
use crate::middleware::log_requests;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;

/// Every route, with request logging and the body size limit from `settings`. The limit is
/// enforced by the body extractors, so an oversized body gets the usual JSON error.
pub fn app(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(inventory_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(log_requests))
                .layer(DefaultBodyLimit::max(settings.body_limit)),
        )
}
