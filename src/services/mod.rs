pub mod sync_engine;
pub mod watch_service;

pub use sync_engine::{FeedSyncEngine, SyncResult, SyncStatus};
pub use watch_service::{PollReport, WatchOptions, WatchService};
