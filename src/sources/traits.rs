use url::Url;

use crate::errors::BulletinResult;

#[cfg_attr(test, mockall::automock)]
pub trait AnnouncementSource: Send + Sync {
    /// Base URL relative media references are resolved against, if any
    fn base_url(&self) -> Option<Url>;

    /// Fetch the raw announcement payload.
    /// Transport failures and non-success responses are errors.
    fn fetch(&self) -> BulletinResult<Vec<u8>>;
}
