use crate::domain::Notification;
use crate::errors::BulletinResult;

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    fn notify(&self, notification: &Notification) -> BulletinResult<()>;
}
