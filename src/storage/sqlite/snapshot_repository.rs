use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

use crate::domain::{AnnouncementId, FeedSnapshot};
use crate::errors::{BulletinError, BulletinResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::SnapshotRepository;

pub struct SqliteSnapshotRepository {
    storage: SqliteStorage,
}

impl SqliteSnapshotRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository {
    fn load(&self) -> BulletinResult<FeedSnapshot> {
        let conn = self.storage.connection()?;

        let mut stmt = conn.prepare("SELECT announcement_id FROM known_announcements")?;
        let known_ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|r| r.map(AnnouncementId::new))
            .collect::<Result<HashSet<_>, _>>()?;
        drop(stmt);

        let last_fetched_at = match conn.query_row(
            "SELECT last_fetched_at FROM sync_state WHERE id = 1",
            [],
            |row| row.get::<_, Option<String>>(0),
        ) {
            Ok(Some(raw)) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Utc),
            ),
            Ok(None) | Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(BulletinError::from(e)),
        };

        Ok(FeedSnapshot::new(known_ids, last_fetched_at))
    }

    fn save(&self, snapshot: &FeedSnapshot) -> BulletinResult<()> {
        let mut conn = self.storage.connection()?;
        let tx = conn.transaction()?;

        // Keep seen_at for ids that survive, drop the ones that disappeared
        tx.execute(
            "CREATE TEMP TABLE IF NOT EXISTS current_ids (announcement_id TEXT PRIMARY KEY)",
            [],
        )?;
        tx.execute("DELETE FROM current_ids", [])?;
        {
            let mut insert_current =
                tx.prepare("INSERT OR IGNORE INTO current_ids (announcement_id) VALUES (?1)")?;
            let mut insert_known = tx.prepare(
                "INSERT OR IGNORE INTO known_announcements (announcement_id) VALUES (?1)",
            )?;
            for id in &snapshot.known_ids {
                insert_current.execute([id.as_str()])?;
                insert_known.execute([id.as_str()])?;
            }
        }
        tx.execute(
            "DELETE FROM known_announcements
             WHERE announcement_id NOT IN (SELECT announcement_id FROM current_ids)",
            [],
        )?;
        tx.execute("DELETE FROM current_ids", [])?;

        tx.execute(
            "INSERT INTO sync_state (id, last_fetched_at) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET last_fetched_at = excluded.last_fetched_at",
            [snapshot.last_fetched_at.map(|t| t.to_rfc3339())],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> BulletinResult<()> {
        let conn = self.storage.connection()?;
        conn.execute_batch("DELETE FROM known_announcements; DELETE FROM sync_state;")?;
        Ok(())
    }
}
