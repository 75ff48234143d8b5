//! Event store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Expose the narrow same-date read used by conflict detection.
//! - Provide CRUD over the single `events` table.
//! - Keep SQL and column naming inside the persistence boundary.
//!
//! # Invariants
//! - Writes call `Event::validate()` before touching SQL.
//! - `events_by_date` returns rows in insertion order.
//! - A malformed `data` column never fails a read; it degrades to empty
//!   attributes (listing) or is surfaced raw for the caller to judge
//!   (`events_by_date`).

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::event::{
    format_timestamp, Attributes, Event, EventId, EventValidationError,
};
use chrono::Utc;
use log::warn;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    start,
    allDay,
    color,
    data,
    createdAt,
    updatedAt
FROM events";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for event storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    AlreadyExists(EventId),
    /// Connection was not migrated to the schema this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "event already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "event repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Minimal row shape needed for conflict detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEventRow {
    pub id: EventId,
    /// Raw attribute blob exactly as stored; may be missing or malformed.
    pub attributes_blob: Option<String>,
}

/// Read interface consumed by conflict detection.
pub trait EventStore {
    /// All rows whose date equals `date` exactly, in natural fetch order.
    fn events_by_date(&self, date: &str) -> RepoResult<Vec<StoredEventRow>>;
}

/// Full CRUD interface over stored events.
pub trait EventRepository: EventStore {
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    /// Replaces every mutable column of an existing event.
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn get_event(&self, id: &str) -> RepoResult<Option<Event>>;
    /// All events ordered by `start ASC, id ASC`.
    fn list_events(&self) -> RepoResult<Vec<Event>>;
    fn delete_event(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Wraps a connection produced by `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = schema_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl EventStore for SqliteEventRepository<'_> {
    fn events_by_date(&self, date: &str) -> RepoResult<Vec<StoredEventRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, data
             FROM events
             WHERE start = ?1
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([date])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(StoredEventRow {
                id: row.get("id")?,
                attributes_blob: raw_text(row.get_ref("data")?),
            });
        }
        Ok(found)
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;
        let now = format_timestamp(Utc::now());
        let data = encode_attributes(&event.attributes)?;

        let inserted = self.conn.execute(
            "INSERT INTO events (id, title, start, allDay, color, data, createdAt, updatedAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                event.id.as_str(),
                event.title.as_str(),
                event.start.as_str(),
                bool_to_int(event.all_day),
                event.color.as_deref(),
                data,
                now,
            ],
        );

        match inserted {
            Ok(_) => Ok(event.id.clone()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::AlreadyExists(event.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;
        let data = encode_attributes(&event.attributes)?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?1,
                start = ?2,
                allDay = ?3,
                color = ?4,
                data = ?5,
                updatedAt = ?6
             WHERE id = ?7;",
            params![
                event.title.as_str(),
                event.start.as_str(),
                bool_to_int(event.all_day),
                event.color.as_deref(),
                data,
                format_timestamp(Utc::now()),
                event.id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id.clone()));
        }
        Ok(())
    }

    fn get_event(&self, id: &str) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let event = stmt.query_row([id], parse_event_row).optional()?;
        Ok(event)
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} ORDER BY start ASC, id ASC;"))?;
        let events = stmt
            .query_map([], parse_event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn delete_event(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM events WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let id: String = row.get("id")?;
    let attributes = decode_attributes(&id, raw_text(row.get_ref("data")?));

    Ok(Event {
        title: row.get("title")?,
        start: row.get("start")?,
        all_day: row.get::<_, i64>("allDay")? != 0,
        color: row.get("color")?,
        attributes,
        created_at: row.get("createdAt")?,
        updated_at: row.get("updatedAt")?,
        id,
    })
}

/// Stored column value rendered as text, whatever affinity it ended up with.
fn raw_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(number) => Some(number.to_string()),
        ValueRef::Real(number) => Some(number.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn decode_attributes(id: &str, blob: Option<String>) -> Attributes {
    let Some(text) = blob else {
        return Attributes::new();
    };
    match serde_json::from_str::<Attributes>(&text) {
        Ok(map) => map,
        Err(err) => {
            warn!(
                "event=event_read module=repo status=degraded event_id={} reason=malformed_attributes error={}",
                id, err
            );
            Attributes::new()
        }
    }
}

fn encode_attributes(attributes: &Attributes) -> RepoResult<String> {
    serde_json::to_string(attributes)
        .map_err(|err| RepoError::InvalidData(format!("attributes not serializable: {err}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
