use crate::domain::FeedSnapshot;
use crate::errors::BulletinResult;

#[cfg_attr(test, mockall::automock)]
pub trait SnapshotRepository: Send + Sync {
    /// Load the stored snapshot, or an empty one if nothing was saved yet
    fn load(&self) -> BulletinResult<FeedSnapshot>;
    /// Replace the stored snapshot wholesale
    fn save(&self, snapshot: &FeedSnapshot) -> BulletinResult<()>;
    fn clear(&self) -> BulletinResult<()>;
}
