//! Booking domain model.
//!
//! # Invariants
//! - An event is identified by a caller-visible string id that never changes.
//! - `start` is the scheduling key and is compared as an opaque token.
//! - Participants live inside the opaque attribute blob and are decoded
//!   leniently: malformed data means "no participants", never an error.

pub mod event;
