use std::sync::{Arc, Mutex};

use booking_core::{BookingService, SqliteEventRepository};
use rusqlite::Connection;

use crate::auth::Authenticator;
use crate::config::ServerConfig;
use crate::routes::ApiError;

/// Shared application state.
///
/// The one SQLite connection sits behind a mutex that is held for a whole
/// use-case, so a conflict check and the write that follows it cannot
/// interleave with another request's.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    auth: Arc<Authenticator>,
}

impl AppState {
    /// `conn` must come from `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection, config: &ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            auth: Arc::new(Authenticator::new(
                &config.base_password,
                &config.jwt_secret,
            )),
        }
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    /// Runs `work` against a booking service while holding the database lock.
    pub fn with_bookings<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&BookingService<SqliteEventRepository<'_>>) -> Result<T, ApiError>,
    {
        let conn = self
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
        let service = BookingService::new(SqliteEventRepository::try_new(&conn)?);
        work(&service)
    }
}
