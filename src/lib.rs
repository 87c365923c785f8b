//! Home inventory: a REST backend for tracked household items, backed by SQLite.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod schemas;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError, FieldError, ValidationError};
pub use response::{created, created_list, ok, ok_list};
pub use routes::{app, common_routes, inventory_routes};
pub use service::{CatalogService, ItemService};
pub use state::AppState;
pub use store::{connect, ensure_tables};
