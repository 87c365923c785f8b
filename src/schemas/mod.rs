//! Validation and serialization boundary between JSON bodies and the model layer.

mod catalog;
mod item;
pub mod rules;

pub use catalog::{
    EventResponse, LabelCreate, LabelQuery, LabelResponse, StateResponse, TagCreate, TagResponse,
    LABEL_COUNT,
};
pub use item::{ItemCreate, ItemQuery, ItemResponse, ItemUpdate, DEFAULT_LIMIT, DEFAULT_QUANTITY, MAX_LIMIT};

use crate::error::ValidationError;
use serde_json::Value;

/// A request body type built from raw JSON, reporting every violated field constraint.
pub trait FromPayload: Sized {
    fn from_payload(value: Value) -> Result<Self, ValidationError>;
}
