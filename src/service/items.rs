//! Item CRUD, containment, tagging and history. Every mutation runs in one transaction.

use crate::error::{AppError, ValidationError};
use crate::models::{Event, Item, ItemChanges, ItemFilter, NewItem};
use crate::sql::{bind_all, select_item_by_id, select_items, select_tags_for_items};
use crate::store::begin_write;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

pub struct ItemService;

#[derive(sqlx::FromRow)]
struct ItemTagRow {
    item_id: i64,
    tag_id: i64,
    tag_name: String,
}

pub(crate) fn item_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("item {}", id))
}

/// A write that lost a race for a label is a conflict, like one caught by `check_references`.
fn label_taken(e: sqlx::Error, label_id: Option<i64>) -> AppError {
    if let (sqlx::Error::Database(db), Some(label_id)) = (&e, label_id) {
        if db.is_unique_violation() {
            return AppError::Conflict(format!("label {} is already attached to another item", label_id));
        }
    }
    e.into()
}

impl ItemService {
    /// Items matching `filter`, ordered by id.
    pub async fn list(pool: &SqlitePool, filter: &ItemFilter) -> Result<Vec<Item>, AppError> {
        let mut conn = pool.acquire().await?;
        fetch_items(&mut conn, filter).await
    }

    /// Direct children of item `id`. The filter's parent is overridden with `id`.
    pub async fn children(pool: &SqlitePool, id: i64, filter: &ItemFilter) -> Result<Vec<Item>, AppError> {
        let mut conn = pool.acquire().await?;
        if !item_exists(&mut conn, id).await? {
            return Err(item_not_found(id));
        }
        let filter = ItemFilter {
            parent_item_id: Some(id),
            root_only: false,
            ..filter.clone()
        };
        fetch_items(&mut conn, &filter).await
    }

    pub async fn read(pool: &SqlitePool, id: i64) -> Result<Item, AppError> {
        let mut conn = pool.acquire().await?;
        fetch_item(&mut conn, id).await?.ok_or_else(|| item_not_found(id))
    }

    /// Insert a validated item, check its references and record the initial event.
    pub async fn create(pool: &SqlitePool, new: &NewItem) -> Result<Item, AppError> {
        let mut tx = begin_write(pool).await?;
        check_references(&mut tx, new, None, None).await?;

        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO items (name, quantity, location, comment, label_id, parent_item_id, state_id, \
             image_lg_path, image_sm_path, creation_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(new.quantity)
        .bind(&new.location)
        .bind(&new.comment)
        .bind(new.label_id)
        .bind(new.parent_item_id)
        .bind(new.state_id)
        .bind(&new.image_lg_path)
        .bind(&new.image_sm_path)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| label_taken(e, new.label_id))?
        .last_insert_rowid();
        record_event(&mut tx, id, new.state_id, new.parent_item_id, now).await?;

        let item = fetch_item(&mut tx, id).await?.ok_or_else(|| item_not_found(id))?;
        tx.commit().await?;
        tracing::info!(item_id = id, name = %item.name, "item created");
        Ok(item)
    }

    /// Apply `changes` to item `id`. Nothing is written when the changes leave the item as it is.
    pub async fn update(pool: &SqlitePool, id: i64, changes: ItemChanges) -> Result<Item, AppError> {
        let mut tx = begin_write(pool).await?;
        let current = fetch_item(&mut tx, id).await?.ok_or_else(|| item_not_found(id))?;
        let prev = current.fields();
        let next = changes.apply(prev.clone());
        if next == prev {
            return Ok(current);
        }
        check_references(&mut tx, &next, Some(id), Some(&prev)).await?;

        let now = Utc::now();
        sqlx::query(
            "UPDATE items SET name = ?, quantity = ?, location = ?, comment = ?, label_id = ?, \
             parent_item_id = ?, state_id = ?, image_lg_path = ?, image_sm_path = ?, last_update = ? \
             WHERE item_id = ?",
        )
        .bind(&next.name)
        .bind(next.quantity)
        .bind(&next.location)
        .bind(&next.comment)
        .bind(next.label_id)
        .bind(next.parent_item_id)
        .bind(next.state_id)
        .bind(&next.image_lg_path)
        .bind(&next.image_sm_path)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| label_taken(e, next.label_id))?;
        if next.state_id != prev.state_id || next.parent_item_id != prev.parent_item_id {
            record_event(&mut tx, id, next.state_id, next.parent_item_id, now).await?;
        }

        let item = fetch_item(&mut tx, id).await?.ok_or_else(|| item_not_found(id))?;
        tx.commit().await?;
        tracing::info!(item_id = id, "item updated");
        Ok(item)
    }

    /// Remove item `id` with its tag links and events. Items that still contain others are kept.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
        let mut tx = begin_write(pool).await?;
        if !item_exists(&mut tx, id).await? {
            return Err(item_not_found(id));
        }
        let children: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE parent_item_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "item {} still contains {} item(s)",
                id, children
            )));
        }
        sqlx::query("DELETE FROM items WHERE item_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(item_id = id, "item deleted");
        Ok(())
    }

    /// Attach tag `tag_id` to item `id`. Attaching an already attached tag changes nothing.
    pub async fn attach_tag(pool: &SqlitePool, id: i64, tag_id: i64) -> Result<Item, AppError> {
        Self::change_tag(
            pool,
            id,
            tag_id,
            "INSERT OR IGNORE INTO item_tags (item_id, tag_id) VALUES (?, ?)",
        )
        .await
    }

    /// Detach tag `tag_id` from item `id`. Detaching a tag the item lacks changes nothing.
    pub async fn detach_tag(pool: &SqlitePool, id: i64, tag_id: i64) -> Result<Item, AppError> {
        Self::change_tag(
            pool,
            id,
            tag_id,
            "DELETE FROM item_tags WHERE item_id = ? AND tag_id = ?",
        )
        .await
    }

    async fn change_tag(pool: &SqlitePool, id: i64, tag_id: i64, sql: &str) -> Result<Item, AppError> {
        let mut tx = begin_write(pool).await?;
        if !item_exists(&mut tx, id).await? {
            return Err(item_not_found(id));
        }
        let tag: Option<i64> = sqlx::query_scalar("SELECT tag_id FROM tags WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_optional(&mut *tx)
            .await?;
        if tag.is_none() {
            return Err(AppError::NotFound(format!("tag {}", tag_id)));
        }
        let changed = sqlx::query(sql)
            .bind(id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if changed > 0 {
            sqlx::query("UPDATE items SET last_update = ? WHERE item_id = ?")
                .bind(Utc::now())
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tracing::info!(item_id = id, tag_id, "item tags changed");
        }
        let item = fetch_item(&mut tx, id).await?.ok_or_else(|| item_not_found(id))?;
        tx.commit().await?;
        Ok(item)
    }

    /// History of item `id`, oldest first.
    pub async fn events(pool: &SqlitePool, id: i64) -> Result<Vec<Event>, AppError> {
        let mut conn = pool.acquire().await?;
        if !item_exists(&mut conn, id).await? {
            return Err(item_not_found(id));
        }
        let events = sqlx::query_as::<_, Event>(
            "SELECT event_id, event_date, item_id, to_state, parent_item_id FROM events \
             WHERE item_id = ? ORDER BY event_id",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(events)
    }
}

pub(crate) async fn item_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT item_id FROM items WHERE item_id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// One item with its tags, or None.
pub(crate) async fn fetch_item(conn: &mut SqliteConnection, id: i64) -> Result<Option<Item>, AppError> {
    let sql = select_item_by_id();
    tracing::debug!(sql = %sql, id, "query");
    let item = sqlx::query_as::<_, Item>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match item {
        Some(item) => {
            let mut items = vec![item];
            load_tags(conn, &mut items).await?;
            Ok(items.pop())
        }
        None => Ok(None),
    }
}

async fn fetch_items(conn: &mut SqliteConnection, filter: &ItemFilter) -> Result<Vec<Item>, AppError> {
    let q = select_items(filter);
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut items = bind_all(sqlx::query_as::<_, Item>(&q.sql), &q.params)
        .fetch_all(&mut *conn)
        .await?;
    load_tags(conn, &mut items).await?;
    Ok(items)
}

async fn load_tags(conn: &mut SqliteConnection, items: &mut [Item]) -> Result<(), AppError> {
    if items.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = items.iter().map(|i| i.item_id).collect();
    let q = select_tags_for_items(&ids);
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let rows = bind_all(sqlx::query_as::<_, ItemTagRow>(&q.sql), &q.params)
        .fetch_all(&mut *conn)
        .await?;
    for row in rows {
        if let Some(item) = items.iter_mut().find(|i| i.item_id == row.item_id) {
            item.tags.push(crate::models::Tag {
                tag_id: row.tag_id,
                tag_name: row.tag_name,
            });
        }
    }
    Ok(())
}

async fn record_event(
    conn: &mut SqliteConnection,
    item_id: i64,
    to_state: Option<i64>,
    parent_item_id: Option<i64>,
    at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO events (event_date, item_id, to_state, parent_item_id) VALUES (?, ?, ?, ?)")
        .bind(at)
        .bind(item_id)
        .bind(to_state)
        .bind(parent_item_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Check label, parent and state references of `next`. Only fields that differ from `prev`
/// are checked. Missing references and containment cycles are validation errors; a label
/// carried by another item is a conflict.
async fn check_references(
    conn: &mut SqliteConnection,
    next: &NewItem,
    id: Option<i64>,
    prev: Option<&NewItem>,
) -> Result<(), AppError> {
    let mut errors = ValidationError::default();
    let mut conflict: Option<String> = None;

    if let Some(label_id) = next.label_id.filter(|l| prev.map_or(true, |p| p.label_id != Some(*l))) {
        let label: Option<i64> = sqlx::query_scalar("SELECT label_id FROM labels WHERE label_id = ?")
            .bind(label_id)
            .fetch_optional(&mut *conn)
            .await?;
        if label.is_none() {
            errors.push("label_id", format!("label {} does not exist", label_id));
        } else {
            let holder: Option<i64> = sqlx::query_scalar("SELECT item_id FROM items WHERE label_id = ?")
                .bind(label_id)
                .fetch_optional(&mut *conn)
                .await?;
            if let Some(holder) = holder.filter(|h| Some(*h) != id) {
                conflict = Some(format!("label {} is already attached to item {}", label_id, holder));
            }
        }
    }

    if let Some(state_id) = next.state_id.filter(|s| prev.map_or(true, |p| p.state_id != Some(*s))) {
        let state: Option<i64> = sqlx::query_scalar("SELECT state_id FROM states WHERE state_id = ?")
            .bind(state_id)
            .fetch_optional(&mut *conn)
            .await?;
        if state.is_none() {
            errors.push("state_id", format!("state {} does not exist", state_id));
        }
    }

    if let Some(parent_id) = next
        .parent_item_id
        .filter(|p| prev.map_or(true, |prev| prev.parent_item_id != Some(*p)))
    {
        if Some(parent_id) == id {
            errors.push("parent_item_id", "an item cannot contain itself");
        } else if !item_exists(conn, parent_id).await? {
            errors.push("parent_item_id", format!("item {} does not exist", parent_id));
        } else if let Some(id) = id {
            if is_ancestor_or_self(conn, id, parent_id).await? {
                errors.push("parent_item_id", format!("item {} is inside item {}", parent_id, id));
            }
        }
    }

    errors.into_result()?;
    match conflict {
        Some(msg) => Err(AppError::Conflict(msg)),
        None => Ok(()),
    }
}

/// True when `ancestor` is `item` or one of the items containing it.
async fn is_ancestor_or_self(conn: &mut SqliteConnection, ancestor: i64, item: i64) -> Result<bool, AppError> {
    // UNION (not UNION ALL) stops the walk if stored data already holds a cycle.
    let found: i64 = sqlx::query_scalar(
        "WITH RECURSIVE chain(id) AS ( \
             SELECT ? \
             UNION \
             SELECT i.parent_item_id FROM items i JOIN chain c ON i.item_id = c.id \
             WHERE i.parent_item_id IS NOT NULL \
         ) SELECT EXISTS (SELECT 1 FROM chain WHERE id = ?)",
    )
    .bind(item)
    .bind(ancestor)
    .fetch_one(&mut *conn)
    .await?;
    Ok(found != 0)
}
