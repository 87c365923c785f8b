//! Persisted record shapes, as read back from SQLite.

mod event;
mod item;
mod catalog;

pub use catalog::{Label, State, Tag};
pub use event::Event;
pub use item::{Item, ItemChanges, ItemFilter, NewItem};
