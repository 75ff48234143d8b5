//! In-memory [`EventStore`] backed by a plain list.
//!
//! Rows are returned in insertion order, mirroring the SQLite store.

use crate::model::event::{Event, EventId};
use crate::repo::event_repo::{EventStore, RepoResult, StoredEventRow};

#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    rows: Vec<(String, StoredEventRow)>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw row; `blob` is kept verbatim, malformed or not.
    pub fn insert_raw(
        &mut self,
        id: impl Into<EventId>,
        date: impl Into<String>,
        blob: Option<&str>,
    ) {
        self.rows.push((
            date.into(),
            StoredEventRow {
                id: id.into(),
                attributes_blob: blob.map(str::to_string),
            },
        ));
    }

    /// Appends an event, serializing its attributes the way the database does.
    pub fn insert_event(&mut self, event: &Event) {
        let blob = serde_json::to_string(&event.attributes).ok();
        self.rows.push((
            event.start.clone(),
            StoredEventRow {
                id: event.id.clone(),
                attributes_blob: blob,
            },
        ));
    }
}

impl EventStore for MemoryEventStore {
    fn events_by_date(&self, date: &str) -> RepoResult<Vec<StoredEventRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|(row_date, _)| row_date == date)
            .map(|(_, row)| row.clone())
            .collect())
    }
}
