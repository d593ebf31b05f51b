use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::{BulletinError, BulletinResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS known_announcements (
    announcement_id TEXT PRIMARY KEY,
    seen_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS sync_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_fetched_at TEXT
);
"#;

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> BulletinResult<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> BulletinResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> BulletinResult<Self> {
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, BulletinError> {
        self.conn
            .lock()
            .map_err(|_| BulletinError::Database(rusqlite::Error::InvalidQuery))
    }
}
