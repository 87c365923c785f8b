//! Tag, label and state handlers.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::Payload;
use crate::response::{created, created_list, ok, ok_list};
use crate::schemas::{
    ItemResponse, LabelCreate, LabelQuery, LabelResponse, StateResponse, TagCreate, TagResponse,
};
use crate::service::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

pub async fn list_states(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let states = CatalogService::list_states(&state.pool).await?;
    Ok(ok_list(
        states.into_iter().map(StateResponse::from).collect(),
    ))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Payload(body): Payload<TagCreate>,
) -> Result<impl IntoResponse, AppError> {
    let tag = CatalogService::create_tag(&state.pool, &body.tag_name).await?;
    Ok(created(TagResponse::from(tag)))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tags = CatalogService::list_tags(&state.pool).await?;
    Ok(ok_list(tags.into_iter().map(TagResponse::from).collect()))
}

pub async fn read_tag(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let tag = CatalogService::read_tag(&state.pool, id).await?;
    Ok(ok(TagResponse::from(tag)))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    CatalogService::delete_tag(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn issue_labels(
    State(state): State<AppState>,
    Payload(body): Payload<LabelCreate>,
) -> Result<impl IntoResponse, AppError> {
    let labels = CatalogService::issue_labels(&state.pool, body.count).await?;
    Ok(created_list(
        labels.into_iter().map(LabelResponse::from).collect(),
    ))
}

pub async fn list_labels(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = LabelQuery::from_params(&params)?;
    let labels = CatalogService::list_labels(&state.pool, query.unassigned_only).await?;
    Ok(ok_list(
        labels.into_iter().map(LabelResponse::from).collect(),
    ))
}

pub async fn read_label(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let label = CatalogService::read_label(&state.pool, id).await?;
    Ok(ok(LabelResponse::from(label)))
}

pub async fn label_item(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let item = CatalogService::label_item(&state.pool, id).await?;
    Ok(ok(ItemResponse::from(item)))
}
