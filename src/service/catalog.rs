//! States, tags and labels.

use super::items::fetch_item;
use crate::error::AppError;
use crate::models::{Item, Label, State, Tag};
use crate::store::begin_write;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct CatalogService;

const LABEL_SELECT: &str = "SELECT l.label_id, l.creation_date, i.item_id FROM labels l \
     LEFT JOIN items i ON i.label_id = l.label_id";

fn tag_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("tag {}", id))
}

fn label_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("label {}", id))
}

impl CatalogService {
    pub async fn list_states(pool: &SqlitePool) -> Result<Vec<State>, AppError> {
        let states = sqlx::query_as::<_, State>("SELECT state_id, state_name FROM states ORDER BY state_id")
            .fetch_all(pool)
            .await?;
        Ok(states)
    }

    /// Create a tag. Names are unique; a taken name is a conflict.
    pub async fn create_tag(pool: &SqlitePool, tag_name: &str) -> Result<Tag, AppError> {
        let res = sqlx::query("INSERT INTO tags (tag_name) VALUES (?)")
            .bind(tag_name)
            .execute(pool)
            .await;
        let tag_id = match res {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::Conflict(format!("tag '{}' already exists", tag_name)));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(tag_id, tag_name, "tag created");
        Ok(Tag {
            tag_id,
            tag_name: tag_name.to_string(),
        })
    }

    pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT tag_id, tag_name FROM tags ORDER BY tag_name, tag_id")
            .fetch_all(pool)
            .await?;
        Ok(tags)
    }

    pub async fn read_tag(pool: &SqlitePool, id: i64) -> Result<Tag, AppError> {
        sqlx::query_as::<_, Tag>("SELECT tag_id, tag_name FROM tags WHERE tag_id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| tag_not_found(id))
    }

    /// Delete a tag; it is detached from every item carrying it.
    pub async fn delete_tag(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM tags WHERE tag_id = ?")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(tag_not_found(id));
        }
        tracing::info!(tag_id = id, "tag deleted");
        Ok(())
    }

    /// Issue `count` new, unassigned labels.
    pub async fn issue_labels(pool: &SqlitePool, count: u32) -> Result<Vec<Label>, AppError> {
        let now = Utc::now();
        let mut tx = begin_write(pool).await?;
        let mut labels = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let label_id = sqlx::query("INSERT INTO labels (creation_date) VALUES (?)")
                .bind(now)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
            labels.push(Label {
                label_id,
                creation_date: now,
                item_id: None,
            });
        }
        tx.commit().await?;
        tracing::info!(count, "labels issued");
        Ok(labels)
    }

    /// All labels, or only those not attached to an item.
    pub async fn list_labels(pool: &SqlitePool, unassigned_only: bool) -> Result<Vec<Label>, AppError> {
        let sql = if unassigned_only {
            format!("{} WHERE i.item_id IS NULL ORDER BY l.label_id", LABEL_SELECT)
        } else {
            format!("{} ORDER BY l.label_id", LABEL_SELECT)
        };
        let labels = sqlx::query_as::<_, Label>(&sql).fetch_all(pool).await?;
        Ok(labels)
    }

    pub async fn read_label(pool: &SqlitePool, id: i64) -> Result<Label, AppError> {
        let sql = format!("{} WHERE l.label_id = ?", LABEL_SELECT);
        sqlx::query_as::<_, Label>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| label_not_found(id))
    }

    /// The item carrying label `id`.
    pub async fn label_item(pool: &SqlitePool, id: i64) -> Result<Item, AppError> {
        let label = Self::read_label(pool, id).await?;
        let item_id = label
            .item_id
            .ok_or_else(|| AppError::NotFound(format!("no item carries label {}", id)))?;
        let mut conn = pool.acquire().await?;
        fetch_item(&mut conn, item_id)
            .await?
            .ok_or_else(|| super::items::item_not_found(item_id))
    }
}
