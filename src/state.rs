use std::sync::Arc;

use sqlx::SqlitePool;

use crate::responder::ResponseGenerator;

/// Shared application state, constructed once at startup and injected into
/// handlers. No handler initializes storage or collaborators lazily.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub responder: Arc<dyn ResponseGenerator>,
}

impl AppState {
    pub fn new(pool: SqlitePool, responder: Arc<dyn ResponseGenerator>) -> Self {
        Self { pool, responder }
    }
}
