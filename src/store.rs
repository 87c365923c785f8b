//! SQLite connection setup, table DDL and seed data.

use crate::config::Settings;
use crate::error::{AppError, ConfigError};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Transaction;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits for another writer's lock before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// States every database starts with. Inserted once; existing rows are left alone.
pub const INITIAL_STATES: &[&str] = &["stored", "not stored"];

/// Tables in dependency order. AUTOINCREMENT keeps ids of deleted rows from being reused.
const TABLES: &[(&str, &str)] = &[
    (
        "states",
        r#"
        CREATE TABLE IF NOT EXISTS states (
            state_id INTEGER PRIMARY KEY AUTOINCREMENT,
            state_name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "labels",
        r#"
        CREATE TABLE IF NOT EXISTS labels (
            label_id INTEGER PRIMARY KEY AUTOINCREMENT,
            creation_date TEXT NOT NULL
        )
        "#,
    ),
    (
        "tags",
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "items",
        r#"
        CREATE TABLE IF NOT EXISTS items (
            item_id INTEGER PRIMARY KEY AUTOINCREMENT,
            label_id INTEGER UNIQUE REFERENCES labels (label_id),
            parent_item_id INTEGER REFERENCES items (item_id),
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 0),
            location TEXT,
            comment TEXT,
            state_id INTEGER REFERENCES states (state_id),
            image_lg_path TEXT,
            image_sm_path TEXT,
            creation_date TEXT NOT NULL,
            last_update TEXT
        )
        "#,
    ),
    (
        "item_tags",
        r#"
        CREATE TABLE IF NOT EXISTS item_tags (
            item_id INTEGER NOT NULL REFERENCES items (item_id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags (tag_id) ON DELETE CASCADE,
            PRIMARY KEY (item_id, tag_id)
        )
        "#,
    ),
    (
        "events",
        r#"
        CREATE TABLE IF NOT EXISTS events (
            event_id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_date TEXT NOT NULL,
            item_id INTEGER NOT NULL REFERENCES items (item_id) ON DELETE CASCADE,
            to_state INTEGER REFERENCES states (state_id),
            parent_item_id INTEGER REFERENCES items (item_id) ON DELETE SET NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_items_parent ON items (parent_item_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_state ON items (state_id)",
    "CREATE INDEX IF NOT EXISTS idx_item_tags_tag ON item_tags (tag_id)",
    "CREATE INDEX IF NOT EXISTS idx_events_item ON events (item_id)",
];

/// Parse a `DATABASE_URL` into connect options.
pub fn parse_database_url(url: &str) -> Result<SqliteConnectOptions, ConfigError> {
    SqliteConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        message: e.to_string(),
    })
}

/// Open the pool described by `settings`. The database file is created if missing, foreign
/// keys are enforced and file databases run in WAL mode so readers never block the writer.
pub async fn connect(settings: &Settings) -> Result<SqlitePool, AppError> {
    let opts = parse_database_url(&settings.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    // Connections never expire: an in-memory database lives only as long as its connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

/// Start a write transaction. `BEGIN IMMEDIATE` takes the write lock up front, so concurrent
/// writers queue on the busy timeout instead of failing when a read lock cannot be upgraded.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, AppError> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Create tables and indexes if missing, then seed the initial states. Idempotent.
pub async fn ensure_tables(pool: &SqlitePool) -> Result<(), AppError> {
    for (name, ddl) in TABLES {
        tracing::debug!(table = name, "ensure table");
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    seed_states(pool).await
}

async fn seed_states(pool: &SqlitePool) -> Result<(), AppError> {
    let mut tx = begin_write(pool).await?;
    for name in INITIAL_STATES {
        let inserted = sqlx::query("INSERT OR IGNORE INTO states (state_name) VALUES (?)")
            .bind(*name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if inserted > 0 {
            tracing::info!(state = name, "seeded state");
        }
    }
    tx.commit().await?;
    Ok(())
}
