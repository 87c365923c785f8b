//! HTTP handlers for items, tags, labels and states.

pub mod catalog;
pub mod items;

use crate::error::AppError;

/// Path ids are positive integers; anything else is a bad request.
pub(crate) fn parse_id(id_str: &str) -> Result<i64, AppError> {
    match id_str.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::BadRequest(format!("invalid id '{}'", id_str))),
    }
}
