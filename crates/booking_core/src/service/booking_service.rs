//! Booking use-case service.
//!
//! # Responsibility
//! - Put the advisory double-booking check in front of every create/update.
//! - Apply submission defaults and validation before persistence.
//! - Serve list/detail reads, including the per-participant "my events" view.
//!
//! # Invariants
//! - An update is checked with its own id excluded.
//! - The service holds no state beyond its repository; serializing concurrent
//!   check+write sequences is the caller's job.

use crate::conflict::find_conflict;
use crate::model::event::{Event, EventDraft, EventId, EventValidationError};
use crate::repo::event_repo::{EventRepository, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a booking use-case.
#[derive(Debug)]
pub enum BookingError {
    Validation(EventValidationError),
    /// `participant` is already booked by another event on `date`.
    ParticipantConflict { participant: String, date: String },
    NotFound(EventId),
    AlreadyExists(EventId),
    Repo(RepoError),
}

impl Display for BookingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ParticipantConflict { participant, date } => write!(
                f,
                "participant \"{participant}\" is already booked for another event on {date}"
            ),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "event already exists: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BookingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::AlreadyExists(id) => Self::AlreadyExists(id),
            other => Self::Repo(other),
        }
    }
}

impl From<EventValidationError> for BookingError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Booking facade over an event repository.
pub struct BookingService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> BookingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a booking after checking its participants for the date.
    pub fn create_booking(&self, draft: EventDraft) -> BookingResult<Event> {
        self.create_booking_at(draft, Utc::now())
    }

    /// [`create_booking`](Self::create_booking) with an explicit submission time.
    pub fn create_booking_at(&self, draft: EventDraft, now: DateTime<Utc>) -> BookingResult<Event> {
        let event = draft.into_event(now);
        event.validate()?;
        self.ensure_no_conflict(&event, None)?;

        let id = self.repo.create_event(&event)?;
        info!(
            "event=booking_create module=service status=ok event_id={} date={}",
            id, event.start
        );
        self.read_back(&id)
    }

    /// Fully replaces an existing booking.
    ///
    /// The id in the path wins over any id carried by the draft.
    pub fn update_booking(&self, id: &str, draft: EventDraft) -> BookingResult<Event> {
        if self.repo.get_event(id)?.is_none() {
            return Err(BookingError::NotFound(id.to_string()));
        }

        let event = EventDraft {
            id: Some(id.to_string()),
            ..draft
        }
        .into_event(Utc::now());
        event.validate()?;
        self.ensure_no_conflict(&event, Some(id))?;

        self.repo.update_event(&event)?;
        info!(
            "event=booking_update module=service status=ok event_id={} date={}",
            id, event.start
        );
        self.read_back(id)
    }

    /// Deletes a booking.
    pub fn cancel_booking(&self, id: &str) -> BookingResult<()> {
        self.repo.delete_event(id)?;
        info!("event=booking_cancel module=service status=ok event_id={id}");
        Ok(())
    }

    pub fn get_booking(&self, id: &str) -> RepoResult<Option<Event>> {
        self.repo.get_event(id)
    }

    /// All bookings ordered by date; narrowed to one participant when given.
    pub fn list_bookings(&self, participant: Option<&str>) -> RepoResult<Vec<Event>> {
        let events = self.repo.list_events()?;
        Ok(match participant {
            Some(name) => events
                .into_iter()
                .filter(|event| event.has_participant(name))
                .collect(),
            None => events,
        })
    }

    /// Runs the double-booking check without writing anything.
    pub fn check_conflict<P: AsRef<str>>(
        &self,
        date: &str,
        participants: &[P],
        exclude_event_id: Option<&str>,
    ) -> RepoResult<Option<String>> {
        find_conflict(&self.repo, date, participants, exclude_event_id)
    }

    fn ensure_no_conflict(&self, event: &Event, exclude: Option<&str>) -> BookingResult<()> {
        let participants = event.participants();
        match find_conflict(&self.repo, &event.start, participants.as_slice(), exclude)? {
            Some(participant) => {
                info!(
                    "event=booking_conflict module=service status=rejected event_id={} date={}",
                    event.id, event.start
                );
                Err(BookingError::ParticipantConflict {
                    participant,
                    date: event.start.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn read_back(&self, id: &str) -> BookingResult<Event> {
        self.repo.get_event(id)?.ok_or_else(|| {
            BookingError::Repo(RepoError::InvalidData(format!(
                "event {id} missing after write"
            )))
        })
    }
}
