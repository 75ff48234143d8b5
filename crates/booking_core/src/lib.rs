//! Core domain logic for the booking calendar.
//! This crate owns the double-booking rule and everything it reads from.

pub mod conflict;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use conflict::find_conflict;
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::event::{
    Attributes, Event, EventAttributes, EventDraft, EventId, EventValidationError, DEFAULT_COLOR,
};
pub use repo::event_repo::{
    EventRepository, EventStore, RepoError, RepoResult, SqliteEventRepository, StoredEventRow,
};
pub use repo::memory::MemoryEventStore;
pub use service::booking_service::{BookingError, BookingResult, BookingService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
