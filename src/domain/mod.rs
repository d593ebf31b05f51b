pub mod announcement;
pub mod snapshot;
pub mod notification;

pub use announcement::{youtube_video_id, Announcement, AnnouncementId};
pub use snapshot::FeedSnapshot;
pub use notification::Notification;
