//! Same-day double-booking detection.
//!
//! # Responsibility
//! - Decide whether any proposed participant is already assigned to another
//!   event on the same date.
//!
//! # Invariants
//! - Read-only: issues exactly one `events_by_date` read, or none when the
//!   date or participant list is empty.
//! - Malformed stored attributes count as zero participants and never fail
//!   the check.
//! - Returns the first collision: stored rows in fetch order, and within a
//!   row, proposed participants in input order.
//! - Advisory only. Callers that need the guarantee to hold must serialize
//!   check and write themselves.

use crate::logging::sanitize_message;
use crate::model::event::{normalize_participant, EventAttributes};
use crate::repo::event_repo::{EventStore, RepoResult};
use log::{debug, warn};

const MAX_DECODE_ERROR_CHARS: usize = 120;

/// Returns the first proposed participant already booked on `date` by an
/// event other than `exclude_event_id`.
///
/// Names are compared after trimming; blank names are ignored on both sides.
/// The returned name is the caller's element exactly as passed in.
/// Duplicates inside `participants` are not a conflict by themselves.
///
/// # Errors
/// Only store transport failures are returned. Bad row data is not an error.
pub fn find_conflict<S, P>(
    store: &S,
    date: &str,
    participants: &[P],
    exclude_event_id: Option<&str>,
) -> RepoResult<Option<String>>
where
    S: EventStore + ?Sized,
    P: AsRef<str>,
{
    if date.trim().is_empty() {
        return Ok(None);
    }

    // (as given, trimmed)
    let proposed: Vec<(&str, &str)> = participants
        .iter()
        .filter_map(|name| {
            let given = name.as_ref();
            normalize_participant(given).map(|trimmed| (given, trimmed))
        })
        .collect();
    if proposed.is_empty() {
        return Ok(None);
    }

    let rows = store.events_by_date(date)?;
    for row in rows {
        if exclude_event_id == Some(row.id.as_str()) {
            continue;
        }

        let booked = match EventAttributes::decode(row.attributes_blob.as_deref()) {
            Ok(attributes) => attributes.participant_names(),
            Err(err) => {
                warn!(
                    "event=conflict_check module=conflict status=degraded event_id={} reason=malformed_attributes error={}",
                    row.id,
                    sanitize_message(&err.to_string(), MAX_DECODE_ERROR_CHARS)
                );
                continue;
            }
        };

        if let Some((given, _)) = proposed
            .iter()
            .find(|(_, trimmed)| booked.iter().any(|taken| taken == trimmed))
        {
            debug!(
                "event=conflict_check module=conflict status=conflict event_id={} date={}",
                row.id, date
            );
            return Ok(Some((*given).to_string()));
        }
    }

    Ok(None)
}
