pub mod traits;
pub mod decode;
pub mod http;

pub use traits::AnnouncementSource;
pub use decode::decode_announcements;
pub use http::HttpAnnouncementSource;
