use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::domain::Notification;
use crate::errors::{BulletinError, BulletinResult};
use crate::notifiers::Notifier;
use crate::services::sync_engine::{FeedSyncEngine, SyncResult};
use crate::sources::AnnouncementSource;
use crate::storage::SnapshotRepository;

#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Send notifications for new announcements
    pub notify: bool,
    /// Save the snapshot after each successful sync
    pub persist: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            notify: true,
            persist: true,
        }
    }
}

#[derive(Debug)]
pub struct PollReport {
    pub result: SyncResult,
    /// Notification built for the new items, whether or not it was sent
    pub notification: Option<Notification>,
    pub notified: bool,
    pub notify_error: Option<BulletinError>,
}

/// Runs the sync engine, stores its snapshot, and raises notifications
pub struct WatchService<S: AnnouncementSource, R: SnapshotRepository> {
    engine: FeedSyncEngine<S>,
    notifier: Box<dyn Notifier>,
    repository: R,
    options: WatchOptions,
}

impl<S: AnnouncementSource, R: SnapshotRepository> WatchService<S, R> {
    pub fn new(
        engine: FeedSyncEngine<S>,
        notifier: Box<dyn Notifier>,
        repository: R,
        options: WatchOptions,
    ) -> Self {
        Self {
            engine,
            notifier,
            repository,
            options,
        }
    }

    /// Build the service with an engine resumed from the stored snapshot
    pub fn resume(
        source: S,
        notifier: Box<dyn Notifier>,
        repository: R,
        options: WatchOptions,
    ) -> BulletinResult<Self> {
        let snapshot = repository.load()?;
        info!(known = snapshot.known_ids.len(), "resuming from stored snapshot");

        let engine = FeedSyncEngine::with_snapshot(source, snapshot);
        Ok(Self::new(engine, notifier, repository, options))
    }

    pub fn engine(&self) -> &FeedSyncEngine<S> {
        &self.engine
    }

    /// One sync, then notification and persistence.
    /// Only storage failures are returned as errors. The engine has already
    /// absorbed the new ids by then, so the notification goes out first.
    pub fn poll_once(&self) -> BulletinResult<PollReport> {
        let result = self.engine.sync();

        let mut report = PollReport {
            notification: result.notification(),
            result,
            notified: false,
            notify_error: None,
        };

        if let (Some(notification), true) = (&report.notification, self.options.notify) {
            match self.notifier.notify(notification) {
                Ok(()) => {
                    info!(count = notification.count, "notification sent");
                    report.notified = true;
                }
                Err(e) => {
                    warn!(error = %e, "failed to send notification");
                    report.notify_error = Some(e);
                }
            }
        }

        if report.result.status.is_success() && self.options.persist {
            self.repository.save(&self.engine.snapshot())?;
        }

        Ok(report)
    }

    /// Poll every `interval` until `max_polls` is reached (forever when None).
    /// A failing poll is logged and the next one runs on schedule.
    pub fn run(&self, interval: Duration, max_polls: Option<u32>) -> u32 {
        let mut polls = 0;

        loop {
            match self.poll_once() {
                Ok(report) => {
                    if let Some(e) = &report.notify_error {
                        warn!(error = %e, "poll finished with notification error");
                    }
                }
                Err(e) => error!(error = %e, "poll failed"),
            }
            polls += 1;

            if max_polls.is_some_and(|max| polls >= max) {
                break;
            }
            thread::sleep(interval);
        }

        polls
    }
}
