//! Event domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the booking calendar.
//! - Provide the typed, lenient view over the participant list stored in the
//!   attribute blob.
//! - Apply submission defaults for drafts coming from the booking form.
//!
//! # Invariants
//! - `id`, `title` and `start` are non-blank for any persisted event.
//! - Blank participant names (unfilled form slots) are never participants.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-visible event identifier.
pub type EventId = String;

/// Opaque key/value attributes attached to an event.
pub type Attributes = Map<String, Value>;

/// Attribute key the booking form writes the assigned dancers under.
pub const PARTICIPANTS_KEY: &str = "dancers";
/// Accepted when [`PARTICIPANTS_KEY`] is absent.
pub const PARTICIPANTS_ALIAS_KEY: &str = "participants";

pub const DEFAULT_TITLE: &str = "Eveniment";
pub const DEFAULT_COLOR: &str = "black";

/// A bookable calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub start: String,
    pub all_day: bool,
    pub color: Option<String>,
    /// Everything the form submitted, participants included.
    pub attributes: Attributes,
    /// RFC 3339, set by the repository.
    pub created_at: Option<String>,
    /// RFC 3339, set by the repository.
    pub updated_at: Option<String>,
}

impl Event {
    /// Creates an all-day event without attributes.
    pub fn new(id: impl Into<EventId>, title: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start: start.into(),
            all_day: true,
            color: None,
            attributes: Attributes::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Replaces the participant list stored in the attributes.
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = participants
            .into_iter()
            .map(|name| Value::String(name.into()))
            .collect();
        self.attributes
            .insert(PARTICIPANTS_KEY.to_string(), Value::Array(names));
        self
    }

    /// Validates fields that must hold for every written event.
    ///
    /// Stored rows are read leniently, but new writes must carry a
    /// decodable participant list.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.trim().is_empty() {
            return Err(EventValidationError::BlankId);
        }
        if self.title.trim().is_empty() {
            return Err(EventValidationError::BlankTitle);
        }
        if self.start.trim().is_empty() {
            return Err(EventValidationError::BlankStart);
        }
        EventAttributes::from_map(&self.attributes)
            .map_err(|err| EventValidationError::MalformedParticipants(err.0))?;
        Ok(())
    }

    /// Participant names assigned to this event, in stored order.
    ///
    /// Returns an empty list when the attributes do not hold a well-formed
    /// list of strings.
    pub fn participants(&self) -> Vec<String> {
        EventAttributes::from_map(&self.attributes)
            .map(|attrs| attrs.participant_names())
            .unwrap_or_default()
    }

    /// Whether `name` (trimmed) is assigned to this event.
    pub fn has_participant(&self, name: &str) -> bool {
        match normalize_participant(name) {
            Some(wanted) => self.participants().iter().any(|p| p == wanted),
            None => false,
        }
    }
}

/// Validation failure for event writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    BlankId,
    BlankTitle,
    BlankStart,
    /// The participant list is present but is not a list of names.
    MalformedParticipants(String),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "event id must not be blank"),
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::BlankStart => write!(f, "event date must not be blank"),
            Self::MalformedParticipants(reason) => {
                write!(f, "event participants must be a list of names: {reason}")
            }
        }
    }
}

impl Error for EventValidationError {}

/// Typed view over the attribute blob.
///
/// Only the participant list is interpreted; every other key stays opaque.
/// The list is read from [`PARTICIPANTS_KEY`] when that key is present and
/// non-null, otherwise from [`PARTICIPANTS_ALIAS_KEY`]. Whatever the alias
/// holds is ignored once the primary key is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttributes {
    participants: Vec<String>,
}

impl EventAttributes {
    /// Decodes a stored blob. `None` and empty text decode to no participants.
    pub fn decode(blob: Option<&str>) -> Result<Self, AttributeDecodeError> {
        let text = match blob.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(text) => text,
        };
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(_) => Err(AttributeDecodeError("expected a JSON object".to_string())),
            Err(err) => Err(AttributeDecodeError(err.to_string())),
        }
    }

    /// Decodes from an already parsed attribute map.
    pub fn from_map(map: &Attributes) -> Result<Self, AttributeDecodeError> {
        let Some((key, value)) = [PARTICIPANTS_KEY, PARTICIPANTS_ALIAS_KEY]
            .into_iter()
            .find_map(|key| map.get(key).filter(|v| !v.is_null()).map(|v| (key, v)))
        else {
            return Ok(Self::default());
        };

        let participants = Vec::<String>::deserialize(value)
            .map_err(|err| AttributeDecodeError(format!("`{key}`: {err}")))?;
        Ok(Self { participants })
    }

    /// Trimmed, non-blank participant names in stored order.
    pub fn participant_names(&self) -> Vec<String> {
        self.participants
            .iter()
            .filter_map(|name| normalize_participant(name))
            .map(str::to_string)
            .collect()
    }
}

/// Attribute blob could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecodeError(pub String);

impl Display for AttributeDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed event attributes: {}", self.0)
    }
}

impl Error for AttributeDecodeError {}

/// Trims a participant name; blank names yield `None`.
pub fn normalize_participant(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Booking form submission before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start: Option<String>,
    pub all_day: bool,
    pub color: Option<String>,
    pub attributes: Attributes,
}

impl EventDraft {
    /// Resolves defaults against `now`.
    ///
    /// - blank id: epoch milliseconds of `now`
    /// - blank title: [`DEFAULT_TITLE`]
    /// - blank start: the UTC calendar date of `now`
    /// - blank color: [`DEFAULT_COLOR`]
    pub fn into_event(self, now: DateTime<Utc>) -> Event {
        Event {
            id: non_blank(self.id).unwrap_or_else(|| now.timestamp_millis().to_string()),
            title: non_blank(self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            start: non_blank(self.start)
                .unwrap_or_else(|| now.date_naive().format("%Y-%m-%d").to_string()),
            all_day: self.all_day,
            color: Some(non_blank(self.color).unwrap_or_else(|| DEFAULT_COLOR.to_string())),
            attributes: self.attributes,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Formats a timestamp the way the repository stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
