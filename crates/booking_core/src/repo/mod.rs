//! Event persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the store read used by conflict detection and the CRUD contract
//!   used by the booking service.
//! - Isolate SQLite details from orchestration code.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`)
//!   in addition to transport errors.

pub mod event_repo;
pub mod memory;
