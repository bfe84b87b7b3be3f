//! SQLite-backed store adapter.
//!
//! # Responsibility
//! - Map each entity kind onto its own table (`links`, `notes`, `events`,
//!   `categories`) inside one database file.
//! - Own the connection as an explicit resource opened lazily on first use.
//!
//! # Invariants
//! - The connection is opened and migrated at most once per store instance.
//! - SQLite work never runs on an async worker thread.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - The first column of every record mapping is the `id` primary key.

use crate::db::DbLocation;
use crate::model::category::CategoryItem;
use crate::model::entity::{Entity, EntityKind};
use crate::model::event::{format_clock_time, parse_clock_time, EventItem};
use crate::model::link::LinkItem;
use crate::model::note::NoteItem;
use crate::repo::store::{StoreAdapter, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, Row};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tokio::task::spawn_blocking;

const DATE_FORMAT: &str = "%Y-%m-%d";

type SharedConnection = Arc<Mutex<Connection>>;

/// Table mapping for one entity kind.
pub trait SqlRecord: Entity {
    const TABLE: &'static str;
    /// Column names in bind order; the first one is `id`.
    const COLUMNS: &'static [&'static str];

    /// Values in `COLUMNS` order.
    fn to_row_values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> StoreResult<Self>;
}

/// Dashboard store holding all four collections in one SQLite database.
///
/// SQLite calls run on the blocking pool; an async caller only suspends
/// while another statement or a foreign lock holds the database.
pub struct SqliteStore {
    location: DbLocation,
    conn: OnceCell<SharedConnection>,
}

impl SqliteStore {
    /// Creates a store for the database file at `path`.
    ///
    /// The file is opened and migrated by the first store call.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            conn: OnceCell::new(),
        }
    }

    /// Creates a store backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            conn: OnceCell::new(),
        }
    }

    /// Wraps an already migrated connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            location: DbLocation::Memory,
            conn: OnceCell::new_with(Some(Arc::new(Mutex::new(conn)))),
        }
    }

    /// Returns whether the underlying connection has been opened.
    pub fn is_open(&self) -> bool {
        self.conn.initialized()
    }

    async fn connection(&self) -> StoreResult<SharedConnection> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let conn = spawn_blocking(move || location.open())
                    .await
                    .map_err(worker_failed)??;
                Ok::<_, StoreError>(Arc::new(Mutex::new(conn)))
            })
            .await?;
        Ok(Arc::clone(conn))
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn run<R, F>(&self, op: F) -> StoreResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<R> + Send + 'static,
    {
        let conn = self.connection().await?;
        spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            op(&guard)
        })
        .await
        .map_err(worker_failed)?
    }
}

fn worker_failed(err: tokio::task::JoinError) -> StoreError {
    StoreError::Unavailable(format!("store worker stopped: {err}"))
}

#[async_trait]
impl<T: SqlRecord> StoreAdapter<T> for SqliteStore {
    async fn get_all(&self) -> StoreResult<Vec<T>> {
        self.run(select_all::<T>).await
    }

    async fn add(&self, entity: &T) -> StoreResult<()> {
        let values = entity.to_row_values();
        let id = entity.id().to_string();
        self.run(move |conn| insert_row(conn, T::TABLE, T::COLUMNS, T::KIND, values, id))
            .await
    }

    async fn update(&self, entity: &T) -> StoreResult<()> {
        let values = entity.to_row_values();
        let id = entity.id().to_string();
        self.run(move |conn| update_row(conn, T::TABLE, T::COLUMNS, T::KIND, values, id))
            .await
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        self.run(move |conn| delete_row(conn, T::TABLE, T::KIND, id))
            .await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.run(|conn| {
            conn.execute(&format!("DELETE FROM {};", T::TABLE), [])?;
            Ok(())
        })
        .await
    }
}

fn select_all<T: SqlRecord>(conn: &Connection) -> StoreResult<Vec<T>> {
    let sql = format!("SELECT {} FROM {};", T::COLUMNS.join(", "), T::TABLE);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(T::from_row(row)?);
    }
    Ok(items)
}

fn insert_row(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    kind: EntityKind,
    values: Vec<Value>,
    id: String,
) -> StoreResult<()> {
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders});",
        columns.join(", ")
    );

    match conn.execute(&sql, params_from_iter(values)) {
        Ok(_) => Ok(()),
        Err(err) if is_constraint_violation(&err) => Err(StoreError::DuplicateId { kind, id }),
        Err(err) => Err(err.into()),
    }
}

fn update_row(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    kind: EntityKind,
    values: Vec<Value>,
    id: String,
) -> StoreResult<()> {
    let assignments = columns
        .iter()
        .enumerate()
        .skip(1)
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {table} SET {assignments} WHERE id = ?1;");

    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(StoreError::NotFound { kind, id });
    }
    Ok(())
}

fn delete_row(conn: &Connection, table: &str, kind: EntityKind, id: String) -> StoreResult<()> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [&id])?;
    if changed == 0 {
        return Err(StoreError::NotFound { kind, id });
    }
    Ok(())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

impl SqlRecord for LinkItem {
    const TABLE: &'static str = "links";
    const COLUMNS: &'static [&'static str] =
        &["id", "url", "title", "category", "created_at", "sort_order"];

    fn to_row_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.url),
            text(&self.title),
            text(&self.category),
            Value::Integer(self.created_at),
            optional_integer(self.order),
        ]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let link = LinkItem {
            id: row.get("id")?,
            url: row.get("url")?,
            title: row.get("title")?,
            category: row.get("category")?,
            created_at: row.get("created_at")?,
            order: row.get("sort_order")?,
        };
        link.validate()
            .map_err(|err| StoreError::InvalidData(format!("links.{}: {err}", link.id)))?;
        Ok(link)
    }
}

impl SqlRecord for NoteItem {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "content", "created_at", "sort_order"];

    fn to_row_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            text(&self.content),
            Value::Integer(self.created_at),
            optional_integer(self.order),
        ]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(NoteItem {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
            order: row.get("sort_order")?,
        })
    }
}

impl SqlRecord for EventItem {
    const TABLE: &'static str = "events";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "event_date",
        "event_time",
        "link",
        "description",
        "created_at",
    ];

    fn to_row_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.title),
            Value::Text(self.date.format(DATE_FORMAT).to_string()),
            self.time
                .map_or(Value::Null, |time| Value::Text(format_clock_time(time))),
            optional_text(self.link.as_deref()),
            optional_text(self.description.as_deref()),
            Value::Integer(self.created_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let id: String = row.get("id")?;

        let date_text: String = row.get("event_date")?;
        let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
            StoreError::InvalidData(format!("invalid date `{date_text}` in events.event_date"))
        })?;

        let time = match row.get::<_, Option<String>>("event_time")? {
            Some(value) => parse_clock_time(&value).map_err(|_| {
                StoreError::InvalidData(format!("invalid time `{value}` in events.event_time"))
            })?,
            None => None,
        };

        Ok(EventItem {
            id,
            title: row.get("title")?,
            date,
            time,
            link: row.get("link")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl SqlRecord for CategoryItem {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "color", "created_at", "sort_order"];

    fn to_row_values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.name),
            optional_text(self.color.as_deref()),
            Value::Integer(self.created_at),
            optional_integer(self.order),
        ]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let category = CategoryItem {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            created_at: row.get("created_at")?,
            order: row.get("sort_order")?,
        };
        category
            .validate()
            .map_err(|err| StoreError::InvalidData(format!("categories.{}: {err}", category.id)))?;
        Ok(category)
    }
}
