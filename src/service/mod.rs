//! Model operations over SQLite: items, and the states, tags and labels they refer to.

mod catalog;
mod items;
pub use catalog::CatalogService;
pub use items::ItemService;
