//! Booking use-case services.
//!
//! Keeps HTTP handlers decoupled from storage details.

pub mod booking_service;
