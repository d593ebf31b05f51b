use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{Announcement, AnnouncementId, FeedSnapshot, Notification};
use crate::errors::{BulletinError, BulletinResult};
use crate::sources::{decode_announcements, AnnouncementSource};

#[derive(Debug)]
pub enum SyncStatus {
    /// Fetch succeeded and the known id set changed
    Updated,
    /// Fetch succeeded with the same id set as before
    Unchanged,
    /// Fetch or decode failed; the snapshot was not touched
    Failed(BulletinError),
    /// Another sync was still running; nothing was done
    AlreadyInProgress,
}

impl SyncStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncStatus::Updated | SyncStatus::Unchanged)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Updated => "updated",
            SyncStatus::Unchanged => "unchanged",
            SyncStatus::Failed(_) => "failed",
            SyncStatus::AlreadyInProgress => "already in progress",
        }
    }
}

#[derive(Debug)]
pub struct SyncResult {
    /// Full list as received from the server
    pub items: Vec<Announcement>,
    /// Items whose id was not known before this sync
    pub new_items: Vec<Announcement>,
    pub status: SyncStatus,
}

impl SyncResult {
    fn rejected(status: SyncStatus) -> Self {
        Self {
            items: Vec::new(),
            new_items: Vec::new(),
            status,
        }
    }

    /// Notification for the new items, if there are any
    pub fn notification(&self) -> Option<Notification> {
        Notification::for_new_announcements(&self.new_items)
    }
}

/// Releases the in-flight flag when dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fetches the announcement list and detects newly published items.
///
/// Only one sync runs at a time per engine: a call made while another is
/// pending is rejected with [`SyncStatus::AlreadyInProgress`]. The snapshot is
/// replaced wholesale after a successful fetch and left alone otherwise.
pub struct FeedSyncEngine<S: AnnouncementSource> {
    source: S,
    snapshot: Mutex<FeedSnapshot>,
    in_flight: AtomicBool,
}

impl<S: AnnouncementSource> FeedSyncEngine<S> {
    pub fn new(source: S) -> Self {
        Self::with_snapshot(source, FeedSnapshot::default())
    }

    /// Resume from a previously saved snapshot
    pub fn with_snapshot(source: S, snapshot: FeedSnapshot) -> Self {
        Self {
            source,
            snapshot: Mutex::new(snapshot),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> FeedSnapshot {
        self.lock_snapshot().clone()
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, FeedSnapshot> {
        // A panic elsewhere cannot leave a half-written snapshot: it is only
        // ever replaced by a single assignment.
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch the current list and diff it against the last known ids
    pub fn sync(&self) -> SyncResult {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("sync requested while another is running, skipping");
            return SyncResult::rejected(SyncStatus::AlreadyInProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let items = match self.fetch_items() {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "announcement sync failed");
                return SyncResult::rejected(SyncStatus::Failed(e));
            }
        };

        let mut snapshot = self.lock_snapshot();
        let (new_items, status, current_ids) = detect_changes(&snapshot.known_ids, &items);

        *snapshot = FeedSnapshot::new(current_ids, Some(Utc::now()));
        drop(snapshot);

        info!(
            total = items.len(),
            new = new_items.len(),
            status = status.label(),
            "announcement sync complete"
        );

        SyncResult {
            items,
            new_items,
            status,
        }
    }

    fn fetch_items(&self) -> BulletinResult<Vec<Announcement>> {
        let payload = self.source.fetch()?;
        let items = decode_announcements(&payload)?;

        Ok(match self.source.base_url() {
            Some(base) => items.into_iter().map(|a| a.resolve_media(&base)).collect(),
            None => items,
        })
    }
}

/// Diff a fetched batch against the known ids.
///
/// With no known ids there is no baseline, so nothing counts as new.
fn detect_changes(
    known_ids: &HashSet<AnnouncementId>,
    items: &[Announcement],
) -> (Vec<Announcement>, SyncStatus, HashSet<AnnouncementId>) {
    let current_ids: HashSet<AnnouncementId> = items.iter().map(|a| a.id.clone()).collect();

    if known_ids.is_empty() {
        let status = if items.is_empty() {
            SyncStatus::Unchanged
        } else {
            SyncStatus::Updated
        };
        return (Vec::new(), status, current_ids);
    }

    let new_items: Vec<Announcement> = items
        .iter()
        .filter(|a| !known_ids.contains(&a.id))
        .cloned()
        .collect();

    let status = if &current_ids != known_ids {
        SyncStatus::Updated
    } else {
        SyncStatus::Unchanged
    };

    (new_items, status, current_ids)
}
