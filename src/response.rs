//! JSON envelopes: one record as `{data}`, a collection as `{data, meta: {count}}`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Record<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct Collection<T> {
    pub data: Vec<T>,
    pub meta: CollectionMeta,
}

#[derive(Debug, Serialize)]
pub struct CollectionMeta {
    pub count: usize,
}

pub type Reply<B> = (StatusCode, Json<B>);

/// 200 with one record.
pub fn ok<T: Serialize>(data: T) -> Reply<Record<T>> {
    (StatusCode::OK, Json(Record { data }))
}

/// 201 with the record just created.
pub fn created<T: Serialize>(data: T) -> Reply<Record<T>> {
    (StatusCode::CREATED, Json(Record { data }))
}

/// 200 with a collection.
pub fn ok_list<T: Serialize>(data: Vec<T>) -> Reply<Collection<T>> {
    (StatusCode::OK, Json(collection(data)))
}

/// 201 with the records just created.
pub fn created_list<T: Serialize>(data: Vec<T>) -> Reply<Collection<T>> {
    (StatusCode::CREATED, Json(collection(data)))
}

fn collection<T>(data: Vec<T>) -> Collection<T> {
    let count = data.len();
    Collection {
        data,
        meta: CollectionMeta { count },
    }
}
