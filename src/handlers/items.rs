//! Item handlers: CRUD, children, history and tag links.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::Payload;
use crate::models::NewItem;
use crate::response::{created, ok, ok_list};
use crate::schemas::{EventResponse, ItemCreate, ItemQuery, ItemResponse, ItemUpdate};
use crate::service::ItemService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

fn to_responses(items: Vec<crate::models::Item>) -> Vec<ItemResponse> {
    items.into_iter().map(ItemResponse::from).collect()
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let ItemQuery(filter) = ItemQuery::from_params(&params)?;
    let items = ItemService::list(&state.pool, &filter).await?;
    Ok(ok_list(to_responses(items)))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(body): Payload<ItemCreate>,
) -> Result<impl IntoResponse, AppError> {
    let item = ItemService::create(&state.pool, &NewItem::from(body)).await?;
    Ok(created(ItemResponse::from(item)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let item = ItemService::read(&state.pool, id).await?;
    Ok(ok(ItemResponse::from(item)))
}

/// PUT: every field is replaced; omitted optional fields are cleared.
pub async fn replace(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Payload(body): Payload<ItemCreate>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let item = ItemService::update(&state.pool, id, NewItem::from(body).into()).await?;
    Ok(ok(ItemResponse::from(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Payload(ItemUpdate(changes)): Payload<ItemUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let item = ItemService::update(&state.pool, id, changes).await?;
    Ok(ok(ItemResponse::from(item)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    ItemService::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn children(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let ItemQuery(filter) = ItemQuery::from_params(&params)?;
    let items = ItemService::children(&state.pool, id, &filter).await?;
    Ok(ok_list(to_responses(items)))
}

pub async fn events(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let events = ItemService::events(&state.pool, id).await?;
    Ok(ok_list(
        events.into_iter().map(EventResponse::from).collect(),
    ))
}

pub async fn attach_tag(
    State(state): State<AppState>,
    Path((id_str, tag_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let tag_id = parse_id(&tag_str)?;
    let item = ItemService::attach_tag(&state.pool, id, tag_id).await?;
    Ok(ok(ItemResponse::from(item)))
}

pub async fn detach_tag(
    State(state): State<AppState>,
    Path((id_str, tag_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let tag_id = parse_id(&tag_str)?;
    let item = ItemService::detach_tag(&state.pool, id, tag_id).await?;
    Ok(ok(ItemResponse::from(item)))
}
